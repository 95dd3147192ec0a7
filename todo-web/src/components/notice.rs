use dioxus::prelude::*;

/// A dismissable message about the outcome of an import or export.
#[derive(Debug, Clone, PartialEq)]
pub struct NoticeMessage {
    pub text: String,
    pub is_error: bool,
}

impl NoticeMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

#[component]
pub fn Notice(mut notice: Signal<Option<NoticeMessage>>) -> Element {
    let Some(message) = notice() else {
        return rsx! {};
    };
    let class = if message.is_error {
        "notice notice-error"
    } else {
        "notice notice-success"
    };

    rsx! {
        div { class: "{class}", role: "status",
            span { "{message.text}" }
            button { class: "notice-close", title: "Dismiss", onclick: move |_| notice.set(None), "✕" }
        }
    }
}
