use super::NoticeMessage;
use crate::Store;
use dioxus::prelude::*;
use todo_list::{StoreError, EXPORT_FILE_NAME, EXPORT_MIME_TYPE};

/// Export download and import upload of `tasks.json`.
#[component]
pub fn ExchangeBar(mut store: Signal<Store>, mut notice: Signal<Option<NoticeMessage>>) -> Element {
    let export = move |_: MouseEvent| {
        let exported = store.read().export();
        let contents = match exported.map(String::from_utf8) {
            Ok(Ok(contents)) => contents,
            Ok(Err(err)) => {
                tracing::warn!("export produced invalid UTF-8: {err}");
                notice.set(Some(NoticeMessage::error("Export failed.")));
                return;
            }
            Err(err) => {
                tracing::warn!("failed to export tasks: {err}");
                notice.set(Some(NoticeMessage::error("Export failed.")));
                return;
            }
        };
        let download = document::eval(&download_script(&contents));
        spawn(async move {
            if let Err(err) = download.join::<bool>().await {
                tracing::warn!("download of exported tasks failed: {err}");
                notice.set(Some(NoticeMessage::error("Export failed.")));
            }
        });
    };

    let import = move |evt: FormEvent| async move {
        let Some(files) = evt.files() else {
            return;
        };
        for name in files.files() {
            let Some(contents) = files.read_file(&name).await else {
                notice.set(Some(NoticeMessage::error(format!("Could not read {name}."))));
                continue;
            };
            let imported = store.write().import_append(&contents);
            let message = match imported {
                Ok(ids) => NoticeMessage::success(format!("Imported {} tasks.", ids.len())),
                Err(StoreError::Import(err)) => {
                    tracing::warn!(file = %name, cause = %err.cause(), "rejected import");
                    NoticeMessage::error(format!("{err}."))
                }
                Err(err) => {
                    tracing::warn!("failed to import tasks: {err}");
                    NoticeMessage::error(format!("Import failed: {err}."))
                }
            };
            notice.set(Some(message));
        }
    };

    rsx! {
        div { class: "exchange-bar",
            button { class: "export-btn", onclick: export, "Export" }
            label { class: "import-btn",
                "Import"
                input {
                    r#type: "file",
                    accept: ".json,application/json",
                    class: "import-file",
                    onchange: import,
                }
            }
        }
    }
}

/// Script that offers `contents` to the user as a `tasks.json` download.
fn download_script(contents: &str) -> String {
    let payload = serde_json::Value::String(contents.to_string());
    format!(
        r#"
        const blob = new Blob([{payload}], {{ type: "{EXPORT_MIME_TYPE}" }});
        const url = URL.createObjectURL(blob);
        const link = document.createElement("a");
        link.href = url;
        link.download = "{EXPORT_FILE_NAME}";
        link.click();
        URL.revokeObjectURL(url);
        return true;
        "#
    )
}
