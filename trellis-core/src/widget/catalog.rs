//! Constructors for every widget kind, with their default properties.
//!
//! Defaults are written out explicitly so the client always receives the
//! full property set for a kind, null values included.

use super::{Prop, Widget, WidgetKind};

impl Widget {
    /// Flex container for layout and styling.
    ///
    /// `width`/`height` take pixels (numbers) or CSS strings, `padding` and
    /// `margin` a number or a `{top, right, bottom, left}` map.
    pub fn container() -> Self {
        Self::with_defaults(
            WidgetKind::Container,
            [
                ("width", Prop::from("auto")),
                ("height", Prop::from("auto")),
                ("padding", Prop::from(0)),
                ("margin", Prop::from(0)),
                ("background", Prop::Null),
                ("border", Prop::Null),
                ("rounded", Prop::from(false)),
                ("shadow", Prop::Null),
                ("align", Prop::from("stretch")),
                ("justify", Prop::from("start")),
                ("direction", Prop::from("column")),
            ],
        )
    }

    /// Horizontal layout.
    pub fn row() -> Self {
        Self::with_defaults(
            WidgetKind::Row,
            [
                ("spacing", Prop::from(0)),
                ("align", Prop::from("start")),
                ("justify", Prop::from("start")),
                ("wrap", Prop::from(false)),
            ],
        )
    }

    /// Vertical layout.
    pub fn column() -> Self {
        Self::with_defaults(
            WidgetKind::Column,
            [
                ("spacing", Prop::from(0)),
                ("align", Prop::from("start")),
                ("justify", Prop::from("start")),
            ],
        )
    }

    /// Children layered on top of each other.
    pub fn stack() -> Self {
        Self::bare(WidgetKind::Stack)
    }

    /// Centers a single child.
    pub fn center(child: Widget) -> Self {
        Self::bare(WidgetKind::Center).child(child)
    }

    /// Flexible gap; fixed when `size` is set.
    pub fn spacer() -> Self {
        Self::with_defaults(WidgetKind::Spacer, [("size", Prop::Null)])
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::with_defaults(
            WidgetKind::Text,
            [
                ("text", Prop::from(text.into())),
                ("size", Prop::from("md")),
                ("weight", Prop::from("normal")),
                ("color", Prop::from("black")),
                ("align", Prop::from("left")),
                ("italic", Prop::from(false)),
                ("underline", Prop::from(false)),
                ("font", Prop::Null),
            ],
        )
    }

    /// `h1` to `h6`.
    pub fn heading(text: impl Into<String>, level: u8) -> Self {
        Self::with_defaults(
            WidgetKind::Heading,
            [
                ("text", Prop::from(text.into())),
                ("level", Prop::from(level.clamp(1, 6))),
                ("color", Prop::from("black")),
                ("weight", Prop::from("bold")),
            ],
        )
    }

    pub fn button(text: impl Into<String>) -> Self {
        Self::with_defaults(
            WidgetKind::Button,
            [
                ("text", Prop::from(text.into())),
                ("color", Prop::from("primary")),
                ("size", Prop::from("md")),
                ("variant", Prop::from("solid")),
                ("rounded", Prop::from(true)),
                ("icon", Prop::Null),
                ("disabled", Prop::from(false)),
            ],
        )
    }

    pub fn text_field() -> Self {
        Self::with_defaults(
            WidgetKind::TextField,
            [
                ("placeholder", Prop::from("")),
                ("value", Prop::from("")),
                ("type", Prop::from("text")),
                ("disabled", Prop::from(false)),
            ],
        )
    }

    pub fn checkbox(label: impl Into<String>) -> Self {
        Self::with_defaults(
            WidgetKind::Checkbox,
            [
                ("checked", Prop::from(false)),
                ("label", Prop::from(label.into())),
                ("disabled", Prop::from(false)),
            ],
        )
    }

    pub fn radio(label: impl Into<String>, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_defaults(
            WidgetKind::Radio,
            [
                ("checked", Prop::from(false)),
                ("label", Prop::from(label.into())),
                ("name", Prop::from(name.into())),
                ("value", Prop::from(value.into())),
            ],
        )
    }

    /// Dropdown over `(value, label)` pairs.
    pub fn select<V, L>(options: impl IntoIterator<Item = (V, L)>) -> Self
    where
        V: Into<String>,
        L: Into<String>,
    {
        let options = options
            .into_iter()
            .map(|(value, label)| {
                let (value, label): (String, String) = (value.into(), label.into());
                Prop::map([("value", value), ("label", label)])
            })
            .collect();
        Self::with_defaults(
            WidgetKind::Select,
            [
                ("options", Prop::List(options)),
                ("value", Prop::from("")),
                ("placeholder", Prop::from("Select...")),
            ],
        )
    }

    pub fn slider() -> Self {
        Self::with_defaults(
            WidgetKind::Slider,
            [
                ("value", Prop::from(0)),
                ("min", Prop::from(0)),
                ("max", Prop::from(100)),
                ("step", Prop::from(1)),
            ],
        )
    }

    pub fn image(src: impl Into<String>) -> Self {
        Self::with_defaults(
            WidgetKind::Image,
            [
                ("src", Prop::from(src.into())),
                ("width", Prop::from("auto")),
                ("height", Prop::from("auto")),
                ("fit", Prop::from("cover")),
                ("rounded", Prop::from(false)),
                ("alt", Prop::from("")),
            ],
        )
    }

    pub fn video(src: impl Into<String>) -> Self {
        Self::with_defaults(
            WidgetKind::Video,
            [
                ("src", Prop::from(src.into())),
                ("controls", Prop::from(true)),
                ("autoplay", Prop::from(false)),
                ("loop", Prop::from(false)),
                ("muted", Prop::from(false)),
            ],
        )
    }

    pub fn icon(name: impl Into<String>) -> Self {
        Self::with_defaults(
            WidgetKind::Icon,
            [
                ("name", Prop::from(name.into())),
                ("size", Prop::from("md")),
                ("color", Prop::from("currentColor")),
            ],
        )
    }

    pub fn link(text: impl Into<String>, to: impl Into<String>) -> Self {
        Self::with_defaults(
            WidgetKind::Link,
            [
                ("text", Prop::from(text.into())),
                ("to", Prop::from(to.into())),
                ("color", Prop::from("blue")),
                ("underline", Prop::from(true)),
            ],
        )
    }

    /// Raw markup inserted verbatim.
    pub fn html(html: impl Into<String>) -> Self {
        Self::with_defaults(WidgetKind::Html, [("html", Prop::from(html.into()))])
    }

    /// Raw stylesheet inserted verbatim.
    pub fn css(css: impl Into<String>) -> Self {
        Self::with_defaults(WidgetKind::Css, [("css", Prop::from(css.into()))])
    }

    /// Transient notification; `duration` is in milliseconds.
    pub fn toast(message: impl Into<String>) -> Self {
        Self::with_defaults(
            WidgetKind::Toast,
            [
                ("message", Prop::from(message.into())),
                ("duration", Prop::from(3000)),
                ("position", Prop::from("top-right")),
            ],
        )
    }

    /// HTTP request issued by the browser.
    ///
    /// Results come back as events: bind `success` and `error` with
    /// [`Widget::on`] to receive the response body or an error object, and
    /// `loading` to receive `true`/`false` around the request. With
    /// `auto_fetch` the request fires as soon as the widget is mounted.
    pub fn api_request(url: impl Into<String>, method: &str) -> Self {
        Self::with_defaults(
            WidgetKind::ApiRequest,
            [
                ("url", Prop::from(url.into())),
                ("method", Prop::from(method.to_ascii_uppercase())),
                ("headers", Prop::Map(Default::default())),
                ("body", Prop::Null),
                ("auto_fetch", Prop::from(true)),
                ("credentials", Prop::from("same-origin")),
            ],
        )
    }

    /// Shorthand for a request that only reads data.
    pub fn fetch_data(url: impl Into<String>) -> Self {
        Self::with_defaults(
            WidgetKind::FetchData,
            [
                ("url", Prop::from(url.into())),
                ("method", Prop::from("GET")),
                ("headers", Prop::Map(Default::default())),
                ("auto_fetch", Prop::from(true)),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop_names(widget: &Widget) -> Vec<&str> {
        widget.props().keys().map(String::as_str).collect()
    }

    #[test]
    fn container_defaults_are_complete() {
        assert_eq!(
            prop_names(&Widget::container()),
            vec![
                "width",
                "height",
                "padding",
                "margin",
                "background",
                "border",
                "rounded",
                "shadow",
                "align",
                "justify",
                "direction"
            ]
        );
    }

    #[test]
    fn button_defaults() {
        let button = Widget::button("Save");
        assert_eq!(button.kind(), WidgetKind::Button);
        assert_eq!(button.prop_value("text").and_then(Prop::as_str), Some("Save"));
        assert_eq!(button.prop_value("variant").and_then(Prop::as_str), Some("solid"));
        assert!(matches!(button.prop_value("disabled"), Some(Prop::Bool(false))));
    }

    #[test]
    fn heading_level_is_clamped() {
        let heading = Widget::heading("Title", 9);
        assert!(matches!(
            heading.prop_value("level"),
            Some(Prop::Number(n)) if n.as_u64() == Some(6)
        ));
    }

    #[test]
    fn center_wraps_its_child() {
        let center = Widget::center(Widget::text("x"));
        assert_eq!(center.child_nodes().len(), 1);
    }

    #[test]
    fn api_request_normalizes_the_method() {
        let request = Widget::api_request("/api/todos", "post");
        assert_eq!(request.prop_value("method").and_then(Prop::as_str), Some("POST"));
        assert_eq!(request.prop_value("credentials").and_then(Prop::as_str), Some("same-origin"));
        assert!(matches!(request.prop_value("headers"), Some(Prop::Map(h)) if h.is_empty()));
        assert!(matches!(request.prop_value("auto_fetch"), Some(Prop::Bool(true))));
        assert_eq!(
            prop_names(&Widget::fetch_data("/api/todos")),
            vec!["url", "method", "headers", "auto_fetch"]
        );
    }

    #[test]
    fn select_options_are_maps() {
        let select = Widget::select([("a", "Apple"), ("b", "Banana")]);
        let Some(Prop::List(options)) = select.prop_value("options") else {
            panic!("options missing");
        };
        assert_eq!(options.len(), 2);
        assert!(matches!(&options[0], Prop::Map(entries) if entries.contains_key("label")));
    }
}
