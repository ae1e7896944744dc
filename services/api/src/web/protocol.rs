//! services/api/src/web/protocol.rs
//!
//! Defines the JSON shapes exchanged with the browser client: the WebSocket
//! event stream and the view models shared by several REST endpoints.

use chrono::{DateTime, Utc};
use lumiere_core::{
    CoverFlow, GeneratedImage, HistoryItem, ItemLayout, PlacedProduct, SessionEvent,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::catalog::ProductRecord;
use crate::imaging::jpeg_data_url;

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================
// NOTE: The client never sends structured messages on this socket; anything it
// sends other than a close frame is ignored.
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once right after the socket opens.
    Snapshot { is_generating: bool, progress: f64 },

    /// A generation session has begun and will attempt `total` colors.
    SessionStarted { session_id: Uuid, total: usize },

    /// One more lighting variant is available.
    VariantReady { image: GeneratedImageView },

    /// The generator produced nothing for this color; it will not appear in the results.
    ColorSkipped { color: String },

    /// Percentage of colors attempted so far.
    Progress { percent: f64 },

    /// The session was recorded in history and its results are now active.
    SessionCompleted {
        history_id: Uuid,
        result_count: usize,
        cancelled: bool,
    },

    /// Reports a problem with the event stream itself.
    Error { message: String },
}

impl From<SessionEvent> for ServerMessage {
    fn from(event: SessionEvent) -> Self {
        match event {
            SessionEvent::Started { session_id, total } => {
                ServerMessage::SessionStarted { session_id, total }
            }
            SessionEvent::VariantReady(image) => ServerMessage::VariantReady {
                image: GeneratedImageView::from(&image),
            },
            SessionEvent::ColorSkipped(color) => ServerMessage::ColorSkipped {
                color: color.label().to_string(),
            },
            SessionEvent::Progress(percent) => ServerMessage::Progress { percent },
        }
    }
}

//=========================================================================================
// Shared View Models
//=========================================================================================

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct GeneratedImageView {
    pub id: Uuid,
    /// `data:image/jpeg;base64,...`
    pub url: String,
    pub color: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl From<&GeneratedImage> for GeneratedImageView {
    fn from(image: &GeneratedImage) -> Self {
        Self {
            id: image.id,
            url: jpeg_data_url(&image.jpeg),
            color: image.color.label().to_string(),
            timestamp: image.created_at.timestamp_millis(),
        }
    }
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct HistoryItemView {
    pub id: Uuid,
    pub original_image: String,
    pub generated_variants: Vec<GeneratedImageView>,
    pub date: DateTime<Utc>,
}

impl From<&HistoryItem> for HistoryItemView {
    fn from(item: &HistoryItem) -> Self {
        Self {
            id: item.id,
            original_image: jpeg_data_url(&item.original.jpeg),
            generated_variants: item
                .generated_variants
                .iter()
                .map(GeneratedImageView::from)
                .collect(),
            date: item.date,
        }
    }
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct ItemLayoutView {
    pub index: usize,
    pub image_id: Uuid,
    pub offset: i64,
    pub translate_y: f64,
    pub translate_z: f64,
    pub rotate_x: f64,
    pub scale: f64,
    pub opacity: f64,
    pub z_index: i64,
}

impl ItemLayoutView {
    fn new(index: usize, image_id: Uuid, layout: ItemLayout) -> Self {
        Self {
            index,
            image_id,
            offset: layout.offset,
            translate_y: layout.translate_y,
            translate_z: layout.translate_z,
            rotate_x: layout.rotate_x,
            scale: layout.scale,
            opacity: layout.opacity,
            z_index: layout.z_index,
        }
    }
}

/// The cover-flow state plus the layout of every rendered item.
#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct CoverFlowView {
    pub center: usize,
    pub len: usize,
    /// Color of the centered item; the client tints the background with it.
    pub centered_color: Option<String>,
    pub items: Vec<ItemLayoutView>,
}

impl CoverFlowView {
    pub fn new(flow: &CoverFlow, results: &[GeneratedImage]) -> Self {
        let items = flow
            .layouts()
            .into_iter()
            .filter_map(|(index, layout)| {
                results
                    .get(index)
                    .map(|image| ItemLayoutView::new(index, image.id, layout))
            })
            .collect();
        Self {
            center: flow.center(),
            len: flow.len(),
            centered_color: results
                .get(flow.center())
                .map(|image| image.color.label().to_string()),
            items,
        }
    }
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct PlacedProductView {
    pub unique_id: Uuid,
    pub product: ProductRecord,
    pub x: f64,
    pub y: f64,
}

impl From<&PlacedProduct> for PlacedProductView {
    fn from(placed: &PlacedProduct) -> Self {
        Self {
            unique_id: placed.unique_id,
            product: ProductRecord::from(&placed.product),
            x: placed.position.x(),
            y: placed.position.y(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use lumiere_core::LightingColor;

    fn image(color: LightingColor) -> GeneratedImage {
        GeneratedImage {
            id: Uuid::new_v4(),
            jpeg: Bytes::from_static(b"abc"),
            color,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn events_serialize_with_snake_case_tags() {
        let json = serde_json::to_value(ServerMessage::from(SessionEvent::ColorSkipped(
            LightingColor::Blue,
        )))
        .unwrap();
        assert_eq!(json["type"], "color_skipped");
        assert_eq!(json["color"], "Blue");

        let json = serde_json::to_value(ServerMessage::Progress { percent: 50.0 }).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["percent"], 50.0);
    }

    #[test]
    fn generated_image_view_uses_data_url() {
        let view = GeneratedImageView::from(&image(LightingColor::Red));
        assert_eq!(view.url, "data:image/jpeg;base64,YWJj");
        assert_eq!(view.color, "Red");
    }

    #[test]
    fn cover_flow_view_reports_centered_color() {
        let results = vec![
            image(LightingColor::Original),
            image(LightingColor::Red),
            image(LightingColor::Green),
        ];
        let mut flow = CoverFlow::new(results.len());
        flow.move_by(1);

        let view = CoverFlowView::new(&flow, &results);
        assert_eq!(view.center, 1);
        assert_eq!(view.centered_color.as_deref(), Some("Red"));
        assert_eq!(view.items.len(), 3);
        assert_eq!(view.items[1].image_id, results[1].id);
        assert_eq!(view.items[1].z_index, 100);
    }
}
