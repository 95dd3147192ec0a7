mod components;
mod storage;

use crate::components::*;
use crate::storage::LocalStorageStore;

use dioxus::prelude::*;
use todo_list::{TaskFilter, TaskStore, DEFAULT_STORAGE_KEY};

/// The store every component reads and writes through.
pub type Store = TaskStore<LocalStorageStore>;

fn main() {
    dioxus::launch(App);
}

static CSS: Asset = asset!("/assets/main.css");

#[component]
fn App() -> Element {
    let store = use_signal(|| TaskStore::open_with_key(LocalStorageStore, DEFAULT_STORAGE_KEY));
    let filter = use_signal(TaskFilter::default);
    let notice = use_signal(|| None::<NoticeMessage>);
    let mut dark = use_signal(|| false);

    let theme = if dark() { "app dark" } else { "app" };

    rsx! {
        document::Stylesheet { href: CSS }
        div { class: "{theme}",
            header { class: "app-header",
                h1 { "Task List" }
                button { class: "theme-toggle", onclick: move |_| dark.set(!dark()),
                    if dark() { "☀️ Light Mode" } else { "🌙 Dark Mode" }
                }
            }
            main { class: "app-main",
                TaskForm { store }
                FilterBar { filter }
                StatsBar { store }
                TaskList { store, filter }
                ExchangeBar { store, notice }
                Notice { notice }
            }
        }
    }
}
