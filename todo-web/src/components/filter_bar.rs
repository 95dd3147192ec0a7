use dioxus::prelude::*;
use todo_list::{Category, Priority, Selector, TaskFilter, filter::ALL_SENTINEL};

/// Live search plus category and priority selectors.
#[component]
pub fn FilterBar(mut filter: Signal<TaskFilter>) -> Element {
    let current = filter();

    rsx! {
        div { class: "filter-bar",
            input {
                r#type: "search",
                class: "search-input",
                placeholder: "Search tasks...",
                value: "{current.search}",
                oninput: move |evt: FormEvent| filter.write().search = evt.value(),
            }
            select {
                class: "filter-category",
                onchange: move |evt: FormEvent| {
                    if let Ok(selector) = evt.value().parse() {
                        filter.write().category = selector;
                    }
                },
                option { value: ALL_SENTINEL, selected: current.category == Selector::All, "All categories" }
                for choice in Category::ALL {
                    option {
                        key: "{choice}",
                        value: "{choice}",
                        selected: current.category == Selector::Only(choice),
                        "{choice}"
                    }
                }
            }
            select {
                class: "filter-priority",
                onchange: move |evt: FormEvent| {
                    if let Ok(selector) = evt.value().parse() {
                        filter.write().priority = selector;
                    }
                },
                option { value: ALL_SENTINEL, selected: current.priority == Selector::All, "All priorities" }
                for choice in Priority::ALL {
                    option {
                        key: "{choice}",
                        value: "{choice}",
                        selected: current.priority == Selector::Only(choice),
                        "{choice}"
                    }
                }
            }
        }
    }
}
