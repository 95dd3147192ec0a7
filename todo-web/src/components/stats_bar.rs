use crate::Store;
use dioxus::prelude::*;

#[component]
pub fn StatsBar(store: Signal<Store>) -> Element {
    let stats = store.read().stats();

    rsx! {
        div { class: "stats",
            span { "Total: " strong { "{stats.total}" } }
            span { "Completed: " strong { "{stats.completed}" } }
            span { class: "stats-overdue", "Overdue: " strong { "{stats.overdue}" } }
        }
    }
}
