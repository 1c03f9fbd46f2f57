//! A todo list: text input, checkboxes and per-item delete buttons.

use trellis_core::{App, AppMeta, Handler, Observable, State, Widget};

#[derive(Debug, Clone, PartialEq)]
struct Todo {
    text: String,
    done: bool,
}

struct Todos {
    items: State<Vec<Todo>>,
    draft: State<String>,
}

impl Todos {
    fn item(&self, index: usize, todo: &Todo) -> Widget {
        let toggle = self.items.clone();
        let remove = self.items.clone();

        Widget::row()
            .spacing(12)
            .align("center")
            .key(index as u64)
            .child(
                Widget::checkbox(todo.text.clone())
                    .prop("checked", todo.done)
                    .on_change(Handler::with_value(move |checked| {
                        let done = checked.as_bool().unwrap_or(false);
                        toggle.update(|items| {
                            let mut items = items.clone();
                            if let Some(item) = items.get_mut(index) {
                                item.done = done;
                            }
                            items
                        });
                    })),
            )
            .child(Widget::spacer())
            .child(
                Widget::button("Delete")
                    .prop("color", "red")
                    .prop("size", "sm")
                    .prop("variant", "ghost")
                    .on_click(move || {
                        remove.update(|items| {
                            let mut items = items.clone();
                            if index < items.len() {
                                items.remove(index);
                            }
                            items
                        });
                    }),
            )
    }
}

impl App for Todos {
    fn build(&self) -> Widget {
        let draft = self.draft.clone();
        let add_items = self.items.clone();
        let add_draft = self.draft.clone();

        let items = self.items.get();
        let remaining = items.iter().filter(|t| !t.done).count();

        Widget::container()
            .width("full")
            .padding(32)
            .child(
                Widget::column()
                    .spacing(24)
                    .child(Widget::heading("Todos", 1))
                    .child(
                        Widget::row()
                            .spacing(12)
                            .child(
                                Widget::text_field()
                                    .prop("placeholder", "What needs doing?")
                                    .prop("value", self.draft.get())
                                    .on_change(Handler::with_value(move |value| {
                                        draft.set(value.as_str().unwrap_or_default().to_string());
                                    })),
                            )
                            .child(Widget::button("Add").on_click(move || {
                                let text = add_draft.get().trim().to_string();
                                if text.is_empty() {
                                    return;
                                }
                                add_items.update(|items| {
                                    let mut items = items.clone();
                                    items.push(Todo { text, done: false });
                                    items
                                });
                                add_draft.set(String::new());
                            })),
                    )
                    .children(items.iter().enumerate().map(|(i, todo)| self.item(i, todo)))
                    .child(Widget::text(format!("{remaining} remaining")).color("gray")),
            )
    }

    fn states(&self) -> Vec<&dyn Observable> {
        vec![&self.items, &self.draft]
    }

    fn meta(&self) -> AppMeta {
        AppMeta::new("Todos")
    }
}

fn main() -> trellis_core::Result<()> {
    trellis_core::run(Todos {
        items: State::new(Vec::new()),
        draft: State::new(String::new()),
    })
}
