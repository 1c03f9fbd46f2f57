//! Widget Kinds
//!
//! The catalog is closed: every widget is one of these kinds, and each kind
//! decides on its own whether it hosts children.

use std::fmt;
use std::str::FromStr;

/// The kind of a widget node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    // Layout
    Container,
    Row,
    Column,
    Stack,
    Center,
    Spacer,

    // Text
    Text,
    Heading,

    // Input
    Button,
    TextField,
    Checkbox,
    Radio,
    Select,
    Slider,

    // Media
    Image,
    Video,
    Icon,

    // Navigation
    Link,

    // Raw escape hatches
    Html,
    Css,

    // Feedback
    Toast,

    // Data
    ApiRequest,
    FetchData,
}

impl WidgetKind {
    /// Every kind, in catalog order.
    pub const ALL: [WidgetKind; 23] = [
        WidgetKind::Container,
        WidgetKind::Row,
        WidgetKind::Column,
        WidgetKind::Stack,
        WidgetKind::Center,
        WidgetKind::Spacer,
        WidgetKind::Text,
        WidgetKind::Heading,
        WidgetKind::Button,
        WidgetKind::TextField,
        WidgetKind::Checkbox,
        WidgetKind::Radio,
        WidgetKind::Select,
        WidgetKind::Slider,
        WidgetKind::Image,
        WidgetKind::Video,
        WidgetKind::Icon,
        WidgetKind::Link,
        WidgetKind::Html,
        WidgetKind::Css,
        WidgetKind::Toast,
        WidgetKind::ApiRequest,
        WidgetKind::FetchData,
    ];

    /// The `type` tag used on the wire.
    pub fn tag(self) -> &'static str {
        match self {
            WidgetKind::Container => "Container",
            WidgetKind::Row => "Row",
            WidgetKind::Column => "Column",
            WidgetKind::Stack => "Stack",
            WidgetKind::Center => "Center",
            WidgetKind::Spacer => "Spacer",
            WidgetKind::Text => "Text",
            WidgetKind::Heading => "Heading",
            WidgetKind::Button => "Button",
            WidgetKind::TextField => "TextField",
            WidgetKind::Checkbox => "Checkbox",
            WidgetKind::Radio => "Radio",
            WidgetKind::Select => "Select",
            WidgetKind::Slider => "Slider",
            WidgetKind::Image => "Image",
            WidgetKind::Video => "Video",
            WidgetKind::Icon => "Icon",
            WidgetKind::Link => "Link",
            WidgetKind::Html => "Html",
            WidgetKind::Css => "Css",
            WidgetKind::Toast => "Toast",
            WidgetKind::ApiRequest => "ApiRequest",
            WidgetKind::FetchData => "FetchData",
        }
    }

    /// Look a kind up by its wire tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Whether this kind serializes a `children` list.
    ///
    /// Only the layout kinds do; everything else is a leaf described by its
    /// props alone.
    pub fn hosts_children(self) -> bool {
        match self {
            WidgetKind::Container
            | WidgetKind::Row
            | WidgetKind::Column
            | WidgetKind::Stack
            | WidgetKind::Center => true,
            WidgetKind::Spacer
            | WidgetKind::Text
            | WidgetKind::Heading
            | WidgetKind::Button
            | WidgetKind::TextField
            | WidgetKind::Checkbox
            | WidgetKind::Radio
            | WidgetKind::Select
            | WidgetKind::Slider
            | WidgetKind::Image
            | WidgetKind::Video
            | WidgetKind::Icon
            | WidgetKind::Link
            | WidgetKind::Html
            | WidgetKind::Css
            | WidgetKind::Toast
            | WidgetKind::ApiRequest
            | WidgetKind::FetchData => false,
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Error returned when parsing an unknown widget tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown widget type `{0}`")]
pub struct UnknownKind(pub String);

impl FromStr for WidgetKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| UnknownKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for kind in WidgetKind::ALL {
            assert_eq!(WidgetKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(WidgetKind::from_tag("TextNode"), None);
    }

    #[test]
    fn only_layout_kinds_host_children() {
        let hosts: Vec<_> = WidgetKind::ALL
            .into_iter()
            .filter(|kind| kind.hosts_children())
            .collect();
        assert_eq!(
            hosts,
            vec![
                WidgetKind::Container,
                WidgetKind::Row,
                WidgetKind::Column,
                WidgetKind::Stack,
                WidgetKind::Center,
            ]
        );
    }

    #[test]
    fn parse_unknown_tag_fails() {
        assert_eq!("Button".parse::<WidgetKind>(), Ok(WidgetKind::Button));
        assert_eq!("FetchData".parse::<WidgetKind>(), Ok(WidgetKind::FetchData));
        assert!("Carousel".parse::<WidgetKind>().is_err());
    }
}
