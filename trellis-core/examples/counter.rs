//! Counter with increment, decrement and reset.
//!
//! ```text
//! cargo run --example counter                      # live on :8000
//! TRELLIS_MODE=build cargo run --example counter   # writes build/
//! ```

use trellis_core::{App, AppMeta, Observable, State, Widget};

struct Counter {
    count: State<i64>,
}

impl App for Counter {
    fn build(&self) -> Widget {
        let inc = self.count.clone();
        let dec = self.count.clone();
        let reset = self.count.clone();
        let count = self.count.get();

        Widget::center(
            Widget::column()
                .spacing(24)
                .align("center")
                .child(Widget::heading("Counter", 1))
                .child(
                    Widget::text(format!("Count: {count}"))
                        .size("3xl")
                        .color(if count < 0 { "red" } else { "black" }),
                )
                .child(
                    Widget::row()
                        .spacing(12)
                        .child(Widget::button("-").prop("variant", "outline").on_click(move || {
                            dec.update(|n| n - 1);
                        }))
                        .child(Widget::button("+").on_click(move || {
                            inc.update(|n| n + 1);
                        })),
                )
                .child(Widget::button("Reset").prop("variant", "ghost").on_click(move || {
                    reset.set(0);
                })),
        )
    }

    fn states(&self) -> Vec<&dyn Observable> {
        vec![&self.count]
    }

    fn meta(&self) -> AppMeta {
        AppMeta::new("Counter").description("A Trellis counter")
    }
}

fn main() -> trellis_core::Result<()> {
    trellis_core::run(Counter { count: State::new(0) })
}
