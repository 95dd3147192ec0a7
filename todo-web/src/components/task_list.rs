use crate::Store;
use chrono::Utc;
use dioxus::prelude::*;
use todo_list::{Task, TaskFilter, TaskId};

/// The visible tasks, in list order. Items can be dragged onto one another to reorder.
#[component]
pub fn TaskList(store: Signal<Store>, filter: Signal<TaskFilter>) -> Element {
    let dragging = use_signal(|| None::<TaskId>);
    let visible: Vec<Task> = store
        .read()
        .filtered(&filter.read())
        .into_iter()
        .cloned()
        .collect();

    rsx! {
        if visible.is_empty() {
            p { class: "empty-list", "No tasks to show" }
        }
        ul { class: "task-list",
            for task in visible {
                TaskItem { key: "{task.id()}", task, store, dragging }
            }
        }
    }
}

#[component]
fn TaskItem(
    task: Task,
    mut store: Signal<Store>,
    mut dragging: Signal<Option<TaskId>>,
) -> Element {
    let id = task.id();
    let mut editing = use_signal(|| None::<String>);

    let text = task.text().to_string();
    let category = task.category();
    let priority = task.priority();
    let due = task
        .due_date()
        .map_or_else(|| "None".to_string(), |date| date.to_string());
    let mut class = String::from("task-item fade-in");
    if task.is_completed() {
        class.push_str(" completed");
    }
    if task.is_overdue(Utc::now()) {
        class.push_str(" overdue");
    }

    let mut save_edit = move || {
        if let Some(draft) = editing() {
            let renamed = store.write().rename(id, &draft);
            if let Err(err) = renamed {
                tracing::warn!("failed to save task {id}: {err}");
            }
        }
        editing.set(None);
    };

    let start_edit = {
        let text = text.clone();
        move |_: MouseEvent| editing.set(Some(text.clone()))
    };

    rsx! {
        li {
            class: "{class}",
            draggable: "true",
            ondragstart: move |_| dragging.set(Some(id)),
            ondragend: move |_| dragging.set(None),
            ondragover: move |evt: DragEvent| evt.prevent_default(),
            ondrop: move |evt: DragEvent| {
                evt.prevent_default();
                let source = dragging();
                dragging.set(None);
                let Some(source) = source.filter(|source| *source != id) else {
                    return;
                };
                let target = store.read().position(id);
                if let Some(index) = target {
                    let moved = store.write().move_to(source, index);
                    if let Err(err) = moved {
                        tracing::warn!("failed to move task {source}: {err}");
                    }
                }
            },
            div { class: "task-details",
                if let Some(draft) = editing() {
                    input {
                        class: "edit-input",
                        value: "{draft}",
                        autofocus: true,
                        oninput: move |evt: FormEvent| editing.set(Some(evt.value())),
                        onkeydown: move |evt: KeyboardEvent| match evt.key() {
                            Key::Enter => save_edit(),
                            Key::Escape => editing.set(None),
                            _ => {}
                        },
                        onblur: move |_| save_edit(),
                    }
                } else {
                    div {
                        class: "task-text",
                        title: "Click to toggle complete",
                        onclick: move |_| {
                            let toggled = store.write().toggle_complete(id);
                            if let Err(err) = toggled {
                                tracing::warn!("failed to save task {id}: {err}");
                            }
                        },
                        "{text}"
                    }
                }
                div { class: "task-meta", "Category: {category} | Priority: {priority} | Due: {due}" }
            }
            div { class: "task-actions",
                button { class: "edit-btn", title: "Edit", onclick: start_edit, "✏️" }
                button {
                    class: "delete-btn",
                    title: "Delete",
                    onclick: move |_| {
                        let deleted = store.write().delete(id);
                        if let Err(err) = deleted {
                            tracing::warn!("failed to delete task {id}: {err}");
                        }
                    },
                    "🗑️"
                }
            }
        }
    }
}
