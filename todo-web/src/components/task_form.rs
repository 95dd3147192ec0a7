use crate::Store;
use chrono::NaiveDate;
use dioxus::prelude::*;
use todo_list::{Category, NewTask, Priority};

/// Input row for new tasks. Enter in the text box or the Add button submits.
#[component]
pub fn TaskForm(mut store: Signal<Store>) -> Element {
    let mut text = use_signal(String::new);
    let mut category = use_signal(Category::default);
    let mut priority = use_signal(Priority::default);
    let mut due = use_signal(String::new);

    let mut add_task = move || {
        let due_date = NaiveDate::parse_from_str(&due(), "%Y-%m-%d").ok();
        let new_task = NewTask::new(text())
            .category(category())
            .priority(priority())
            .due(due_date);
        let created = store.write().create(new_task);
        match created {
            Ok(Some(task)) => {
                tracing::debug!(id = %task.id(), "added task");
                text.set(String::new());
                due.set(String::new());
            }
            Ok(None) => {}
            Err(err) => tracing::warn!("failed to save new task: {err}"),
        }
    };

    rsx! {
        div { class: "task-form",
            input {
                r#type: "text",
                class: "task-input",
                placeholder: "What needs doing?",
                value: "{text}",
                oninput: move |evt: FormEvent| text.set(evt.value()),
                onkeydown: move |evt: KeyboardEvent| {
                    if evt.key() == Key::Enter {
                        add_task();
                    }
                },
            }
            select {
                class: "category-select",
                onchange: move |evt: FormEvent| {
                    if let Ok(value) = evt.value().parse() {
                        category.set(value);
                    }
                },
                for choice in Category::ALL {
                    option { key: "{choice}", value: "{choice}", selected: choice == category(), "{choice}" }
                }
            }
            select {
                class: "priority-select",
                onchange: move |evt: FormEvent| {
                    if let Ok(value) = evt.value().parse() {
                        priority.set(value);
                    }
                },
                for choice in Priority::ALL {
                    option { key: "{choice}", value: "{choice}", selected: choice == priority(), "{choice}" }
                }
            }
            input {
                r#type: "date",
                class: "due-date",
                value: "{due}",
                oninput: move |evt: FormEvent| due.set(evt.value()),
            }
            button { class: "add-btn", onclick: move |_| add_task(), "Add" }
        }
    }
}
