//! The per-widget wire record.
//!
//! Every synced widget travels as one record: kind id, a packed schema
//! version, the base envelope shared by all kinds, then kind-specific
//! extras. The version is an additive chain (base + attribute count +
//! per-kind delta), checked on decode rather than negotiated.
//!
//! Decoding builds a [`WidgetRecord`] first; applying it to a live
//! [`Widget`] goes through the normal setters so replicas keep the same
//! clamping behavior as the host.

use vantage_ui::{
    AnimKind, AnimState, Anchor, Color, LayoutMode, RenderPriority, Widget, WidgetId, WidgetKind,
};

use crate::codec::{ByteReader, ByteWriter, MAX_STRING_LEN};
use crate::error::DecodeError;

/// Kind-specific extra fields appended after the base envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum KindExtras {
    /// Frames carry nothing beyond the base envelope.
    None,
    /// Label text and its color.
    Label {
        /// The displayed text.
        text: String,
        /// The text color.
        color: Color,
    },
    /// Button caption and interactivity.
    Button {
        /// The caption text.
        text: String,
        /// Whether the button accepts clicks.
        enabled: bool,
    },
    /// Container arrangement settings.
    Container {
        /// Child arrangement mode.
        layout: LayoutMode,
        /// Block alignment inside the container.
        align: Anchor,
        /// Reversed child order.
        reverse: bool,
        /// Fill-available-space sizing.
        auto: bool,
    },
}

/// A decoded (or to-be-encoded) widget wire record.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetRecord {
    /// The widget's wire id.
    pub id: WidgetId,
    /// The concrete kind.
    pub kind: WidgetKind,
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in canvas units.
    pub width: i32,
    /// Height in canvas units.
    pub height: i32,
    /// Placement anchor.
    pub anchor: Anchor,
    /// Visibility flag.
    pub visible: bool,
    /// Draw-order priority.
    pub priority: RenderPriority,
    /// Hover tooltip.
    pub tooltip: String,
    /// Owner tag.
    pub owner: String,
    /// Animation machine state.
    pub anim: AnimState,
    /// Kind-specific trailer.
    pub extras: KindExtras,
}

impl WidgetRecord {
    /// Snapshots a live widget into a record ready for encoding.
    #[must_use]
    pub fn capture(widget: &Widget) -> Self {
        let extras = match widget.kind() {
            WidgetKind::Frame => KindExtras::None,
            WidgetKind::Label => KindExtras::Label {
                text: label_text(widget),
                color: label_color(widget),
            },
            WidgetKind::Button => KindExtras::Button {
                text: label_text(widget),
                enabled: widget.is_enabled(),
            },
            WidgetKind::Container => {
                let state = widget.container();
                KindExtras::Container {
                    layout: state.map_or(LayoutMode::Vertical, |s| s.layout_mode),
                    align: state.map_or(Anchor::TopLeft, |s| s.align),
                    reverse: state.is_some_and(|s| s.reverse),
                    auto: state.map_or(true, |s| s.auto),
                }
            }
        };
        Self {
            id: widget.id(),
            kind: widget.kind(),
            x: widget.x(),
            y: widget.y(),
            width: widget.width(),
            height: widget.height(),
            anchor: widget.anchor(),
            visible: widget.is_visible(),
            priority: widget.priority(),
            tooltip: widget.tooltip().to_owned(),
            owner: widget.owner().to_owned(),
            anim: widget.anim,
            extras,
        }
    }

    /// Encodes the record: kind id, packed version, base envelope,
    /// kind extras.
    pub fn encode(&self, writer: &mut ByteWriter) {
        writer.write_u8(self.kind.id());
        writer.write_packed(self.kind.wire_version() as i32);
        writer.write_i32(self.x);
        writer.write_i32(self.y);
        writer.write_i32(self.width);
        writer.write_i32(self.height);
        writer.write_u8(self.anchor.id());
        writer.write_bool(self.visible);
        writer.write_i32(i32::from(self.priority.id()));
        writer.write_packed(self.id.raw() as i32);
        writer.write_string(&self.tooltip, false);
        writer.write_string(&self.owner, true);
        writer.write_u8(self.anim.kind.id());
        writer.write_u8(self.anim.flags);
        writer.write_f32(self.anim.value);
        writer.write_u16(self.anim.ticks_per_frame);
        writer.write_u16(self.anim.frame_count);
        match &self.extras {
            KindExtras::None => {}
            KindExtras::Label { text, color } => {
                writer.write_string(text, false);
                writer.write_color(*color);
            }
            KindExtras::Button { text, enabled } => {
                writer.write_string(text, false);
                writer.write_bool(*enabled);
            }
            KindExtras::Container {
                layout,
                align,
                reverse,
                auto,
            } => {
                writer.write_u8(layout.id());
                writer.write_u8(align.id());
                writer.write_bool(*reverse);
                writer.write_bool(*auto);
            }
        }
    }

    /// Decodes one record with the default string length cap.
    ///
    /// # Errors
    ///
    /// Any [`DecodeError`]: unknown enum ids, a version mismatch, bad
    /// string prefixes, or a truncated buffer.
    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Self::decode_with_limit(reader, MAX_STRING_LEN)
    }

    /// Decodes one record, capping string prefixes at `max_string`.
    ///
    /// # Errors
    ///
    /// Any [`DecodeError`]: unknown enum ids, a version mismatch, bad
    /// string prefixes, or a truncated buffer.
    pub fn decode_with_limit(
        reader: &mut ByteReader<'_>,
        max_string: i32,
    ) -> Result<Self, DecodeError> {
        let kind_id = reader.read_u8()?;
        let kind = WidgetKind::from_id(kind_id).ok_or(DecodeError::UnknownKind(kind_id))?;
        let version = reader.read_packed()? as u32;
        if version != kind.wire_version() {
            return Err(DecodeError::VersionMismatch {
                kind,
                expected: kind.wire_version(),
                found: version,
            });
        }
        let x = reader.read_i32()?;
        let y = reader.read_i32()?;
        let width = reader.read_i32()?;
        let height = reader.read_i32()?;
        let anchor_id = reader.read_u8()?;
        let anchor = Anchor::from_id(anchor_id).ok_or(DecodeError::UnknownAnchor(anchor_id))?;
        let visible = reader.read_bool()?;
        let priority_id = reader.read_i32()?;
        let priority = u8::try_from(priority_id)
            .ok()
            .and_then(RenderPriority::from_id)
            .ok_or(DecodeError::UnknownPriority(priority_id))?;
        let raw_id = reader.read_packed()?;
        let id = u32::try_from(raw_id)
            .map(WidgetId)
            .map_err(|_| DecodeError::InvalidWidgetId(raw_id))?;
        let tooltip = reader.read_string(max_string, false)?;
        let owner = reader.read_string(max_string, true)?;
        let anim_id = reader.read_u8()?;
        let anim_kind = AnimKind::from_id(anim_id).ok_or(DecodeError::UnknownAnim(anim_id))?;
        let flags = reader.read_u8()?;
        let value = reader.read_f32()?;
        let ticks_per_frame = reader.read_u16()?;
        let frame_count = reader.read_u16()?;
        let anim = AnimState {
            kind: anim_kind,
            value,
            frame_count,
            ticks_per_frame,
            flags,
            tick: 0,
            frame: 0,
        };
        let extras = match kind {
            WidgetKind::Frame => KindExtras::None,
            WidgetKind::Label => KindExtras::Label {
                text: reader.read_string(max_string, false)?,
                color: reader.read_color()?,
            },
            WidgetKind::Button => KindExtras::Button {
                text: reader.read_string(max_string, false)?,
                enabled: reader.read_bool()?,
            },
            WidgetKind::Container => {
                let layout_id = reader.read_u8()?;
                let layout = LayoutMode::from_id(layout_id)
                    .ok_or(DecodeError::UnknownLayout(layout_id))?;
                let align_id = reader.read_u8()?;
                let align =
                    Anchor::from_id(align_id).ok_or(DecodeError::UnknownAnchor(align_id))?;
                KindExtras::Container {
                    layout,
                    align,
                    reverse: reader.read_bool()?,
                    auto: reader.read_bool()?,
                }
            }
        };
        Ok(Self {
            id,
            kind,
            x,
            y,
            width,
            height,
            anchor,
            visible,
            priority,
            tooltip,
            owner,
            anim,
            extras,
        })
    }

    /// Overlays the record onto a live widget through its setters.
    ///
    /// The widget's identity (id, parent, child list) is untouched;
    /// attribute diffs travel separately.
    pub fn apply_to(&self, widget: &mut Widget) {
        // Bounds may clamp incoming geometry exactly as they would a
        // local mutation.
        widget.set_x(self.x);
        widget.set_y(self.y);
        widget.set_width(self.width);
        widget.set_height(self.height);
        widget.set_anchor(self.anchor);
        widget.set_visible(self.visible);
        widget.set_priority(self.priority);
        widget.set_tooltip(self.tooltip.clone());
        widget.set_owner(self.owner.clone());
        widget.anim = self.anim;
        match &self.extras {
            KindExtras::None => {}
            KindExtras::Label { text, color } => {
                let applied = widget
                    .attrs
                    .apply(vantage_ui::AttrKey::Text, vantage_ui::AttrValue::Str(text.clone()));
                debug_assert!(applied.is_ok(), "the text key stores strings");
                let applied = widget
                    .attrs
                    .apply(vantage_ui::AttrKey::TextColor, vantage_ui::AttrValue::Color(*color));
                debug_assert!(applied.is_ok(), "the text color key stores colors");
            }
            KindExtras::Button { text, enabled } => {
                let applied = widget
                    .attrs
                    .apply(vantage_ui::AttrKey::Text, vantage_ui::AttrValue::Str(text.clone()));
                debug_assert!(applied.is_ok(), "the text key stores strings");
                widget.set_enabled(*enabled);
            }
            KindExtras::Container {
                layout,
                align,
                reverse,
                auto,
            } => {
                if let Some(state) = widget.container_mut() {
                    state.layout_mode = *layout;
                    state.align = *align;
                    state.reverse = *reverse;
                    state.auto = *auto;
                    state.invalidate_layout();
                }
            }
        }
    }

    /// Builds a fresh replica widget from the record.
    #[must_use]
    pub fn into_widget(self) -> Widget {
        let mut widget = Widget::new(self.kind);
        self.apply_to(&mut widget);
        widget
    }
}

fn label_text(widget: &Widget) -> String {
    match widget
        .attrs
        .get_owned(vantage_ui::AttrKey::Text, None)
    {
        Some(vantage_ui::AttrValue::Str(text)) => text,
        _ => String::new(),
    }
}

fn label_color(widget: &Widget) -> Color {
    match widget
        .attrs
        .get_owned(vantage_ui::AttrKey::TextColor, None)
    {
        Some(vantage_ui::AttrValue::Color(color)) => color,
        _ => Color::WHITE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_ui::{AttrKey, AttrValue, Margin, WidgetTree};

    fn decode_bytes(bytes: &[u8]) -> Result<WidgetRecord, DecodeError> {
        let mut reader = ByteReader::new(bytes);
        WidgetRecord::decode(&mut reader)
    }

    #[test]
    fn test_label_record_round_trip() {
        let mut tree = WidgetTree::new();
        let id = tree.create(WidgetKind::Label);
        {
            let widget = tree.get_mut(id).unwrap();
            widget.set_x(12);
            widget.set_y(-7);
            widget.set_tooltip("hit points");
            widget.set_margin(Margin::uniform(2));
            widget
                .attrs
                .set(AttrKey::Text, AttrValue::Str("HP: 20".into()))
                .unwrap();
            widget
                .attrs
                .set(AttrKey::TextColor, AttrValue::Color(Color::new(0xFF, 0, 0, 0xFF)))
                .unwrap();
        }
        let record = WidgetRecord::capture(tree.get(id).unwrap());
        let mut writer = ByteWriter::new();
        record.encode(&mut writer);
        let decoded = decode_bytes(writer.as_slice()).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(
            decoded.extras,
            KindExtras::Label {
                text: "HP: 20".into(),
                color: Color::new(0xFF, 0, 0, 0xFF),
            }
        );
    }

    #[test]
    fn test_container_record_round_trip() {
        let mut tree = WidgetTree::new();
        let id = tree.create(WidgetKind::Container);
        tree.set_layout_mode(id, LayoutMode::Horizontal);
        tree.set_reverse(id, true);
        let record = WidgetRecord::capture(tree.get(id).unwrap());
        let mut writer = ByteWriter::new();
        record.encode(&mut writer);
        let decoded = decode_bytes(writer.as_slice()).unwrap();
        assert_eq!(
            decoded.extras,
            KindExtras::Container {
                layout: LayoutMode::Horizontal,
                align: Anchor::TopLeft,
                reverse: true,
                auto: true,
            }
        );
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let record = WidgetRecord::capture(&Widget::new(WidgetKind::Frame));
        let mut writer = ByteWriter::new();
        record.encode(&mut writer);
        let mut bytes = writer.into_bytes();
        // Corrupt the packed version byte right after the kind id.
        bytes[1] ^= 0x01;
        assert!(matches!(
            decode_bytes(&bytes),
            Err(DecodeError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert_eq!(decode_bytes(&[0xEE]), Err(DecodeError::UnknownKind(0xEE)));
    }

    #[test]
    fn test_apply_overlays_label_extras() {
        let mut source = Widget::new(WidgetKind::Label);
        source
            .attrs
            .set(AttrKey::Text, AttrValue::Str("Mana: 50".into()))
            .unwrap();
        source
            .attrs
            .set(AttrKey::TextColor, AttrValue::Color(Color::new(0, 0, 0xFF, 0xFF)))
            .unwrap();
        let record = WidgetRecord::capture(&source);

        let mut target = Widget::new(WidgetKind::Label);
        record.apply_to(&mut target);
        assert_eq!(
            target.attrs.get_owned(AttrKey::Text, None),
            Some(AttrValue::Str("Mana: 50".into()))
        );
        assert_eq!(
            target.attrs.get_owned(AttrKey::TextColor, None),
            Some(AttrValue::Color(Color::new(0, 0, 0xFF, 0xFF)))
        );
        // Remote state is applied silently, never re-sent.
        assert!(!target.attrs.is_dirty());
    }

    #[test]
    fn test_apply_preserves_identity() {
        let mut tree = WidgetTree::new();
        let parent = tree.create(WidgetKind::Container);
        let child = tree.create(WidgetKind::Button);
        tree.attach(child, parent, None).unwrap();

        let mut source = Widget::new(WidgetKind::Button);
        source.set_x(33);
        source.set_enabled(false);
        let record = WidgetRecord::capture(&source);

        let target = tree.get_mut(child).unwrap();
        record.apply_to(target);
        assert_eq!(target.x(), 33);
        assert!(!target.is_enabled());
        assert_eq!(target.parent(), Some(parent));
        assert_eq!(target.id(), child);
    }
}
