//! Cloud Vision `images:annotate` request and response types.
//!
//! Only object localisation is requested. Each localised object carries a
//! bounding polygon in normalised image coordinates; the polygon is reduced
//! to its enclosing axis-aligned box before aggregation.
//!
//! See: <https://cloud.google.com/vision/docs/object-localizer>

use base64::{Engine as _, engine::general_purpose};
use log::warn;
use serde::{Deserialize, Serialize};
use sightline_core::{BoundingBox, DetectedObject, ServiceError};

use super::status::RpcStatus;

const OBJECT_LOCALIZATION: &str = "OBJECT_LOCALIZATION";

/// Batch request body for `images:annotate`.
#[derive(Debug, Serialize)]
pub struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
struct AnnotateImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
}

impl AnnotateRequest {
    /// Request object localisation for a single encoded image.
    #[must_use]
    pub fn object_localization(image: &[u8]) -> Self {
        Self {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: general_purpose::STANDARD.encode(image),
                },
                features: vec![Feature {
                    kind: OBJECT_LOCALIZATION,
                }],
            }],
        }
    }
}

/// Batch response body for `images:annotate`.
#[derive(Debug, Deserialize)]
pub struct AnnotateResponse {
    /// One entry per image in the request.
    #[serde(default)]
    pub responses: Vec<AnnotateImageResponse>,
}

/// Annotations for one image.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateImageResponse {
    /// Localised objects; absent when nothing was found.
    #[serde(default)]
    pub localized_object_annotations: Vec<LocalizedObjectAnnotation>,
    /// Per-image failure.
    #[serde(default)]
    pub error: Option<RpcStatus>,
}

/// A single localised object.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedObjectAnnotation {
    /// Object name, e.g. `"Car"`.
    pub name: String,
    /// Detection confidence in `[0, 1]`.
    #[serde(default)]
    pub score: f64,
    /// Region occupied by the object.
    pub bounding_poly: BoundingPoly,
}

/// Polygon outlining a localised object.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingPoly {
    /// Vertices in normalised image coordinates.
    #[serde(default)]
    pub normalized_vertices: Vec<NormalizedVertex>,
}

/// Polygon vertex; the API omits components equal to zero.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct NormalizedVertex {
    /// Horizontal fraction of the image width.
    #[serde(default)]
    pub x: f64,
    /// Vertical fraction of the image height.
    #[serde(default)]
    pub y: f64,
}

impl NormalizedVertex {
    fn is_normalised(self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

impl AnnotateResponse {
    /// Convert the first image's annotations into detected objects.
    pub fn into_detections(self) -> Result<Vec<DetectedObject>, ServiceError> {
        let image = self
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::Parse {
                message: "vision response contained no image results".to_owned(),
            })?;
        if let Some(error) = image.error.filter(|error| error.code != 0) {
            return Err(error.into_service_error());
        }
        image
            .localized_object_annotations
            .into_iter()
            .map(LocalizedObjectAnnotation::into_detection)
            .collect()
    }
}

impl LocalizedObjectAnnotation {
    fn into_detection(self) -> Result<DetectedObject, ServiceError> {
        let name = self.name;
        let raw = self.bounding_poly.normalized_vertices;
        if raw.iter().any(|vertex| !vertex.is_normalised()) {
            warn!("clamping out-of-range vertices reported for {name:?}");
        }
        let vertices = raw
            .into_iter()
            .map(|vertex| (vertex.x.clamp(0.0, 1.0), vertex.y.clamp(0.0, 1.0)));
        let bbox = BoundingBox::enclosing(vertices).map_err(|err| ServiceError::Parse {
            message: format!("invalid bounding polygon for {name:?}: {err}"),
        })?;
        let confidence = self.score.clamp(0.0, 1.0);
        DetectedObject::new(name.as_str(), confidence, bbox).map_err(|err| ServiceError::Parse {
            message: format!("invalid detection for {name:?}: {err}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn request_encodes_image_as_base64() {
        let request = AnnotateRequest::object_localization(b"jpeg");
        let json = serde_json::to_value(&request).expect("should serialise");

        assert_eq!(
            json,
            serde_json::json!({
                "requests": [{
                    "image": {"content": "anBlZw=="},
                    "features": [{"type": "OBJECT_LOCALIZATION"}]
                }]
            })
        );
    }

    #[rstest]
    fn annotations_become_enclosing_boxes() {
        let json = r#"{
            "responses": [{
                "localizedObjectAnnotations": [
                    {
                        "mid": "/m/0k4j",
                        "name": "Car",
                        "score": 0.93,
                        "boundingPoly": {"normalizedVertices": [
                            {"x": 0.1, "y": 0.1},
                            {"x": 0.5, "y": 0.1},
                            {"x": 0.5, "y": 0.5},
                            {"x": 0.1, "y": 0.5}
                        ]}
                    },
                    {
                        "name": "Building",
                        "score": 0.81,
                        "boundingPoly": {"normalizedVertices": [
                            {},
                            {"x": 1.0},
                            {"x": 1.0, "y": 1.0},
                            {"y": 1.0}
                        ]}
                    }
                ]
            }]
        }"#;

        let response: AnnotateResponse = serde_json::from_str(json).expect("should deserialise");
        let detections = response.into_detections().expect("should convert");

        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].label(), "Car");
        assert_eq!(detections[0].bounding_box().min(), (0.1, 0.1));
        assert_eq!(detections[0].bounding_box().max(), (0.5, 0.5));
        assert_eq!(detections[1].bounding_box().min(), (0.0, 0.0));
        assert_eq!(detections[1].bounding_box().max(), (1.0, 1.0));
    }

    #[rstest]
    fn overshooting_vertices_are_clamped() {
        let json = r#"{
            "responses": [{
                "localizedObjectAnnotations": [{
                    "name": "Tree",
                    "score": 0.7,
                    "boundingPoly": {"normalizedVertices": [
                        {"x": 0.2, "y": 0.3},
                        {"x": 1.0000001, "y": 0.9}
                    ]}
                }]
            }]
        }"#;

        let response: AnnotateResponse = serde_json::from_str(json).expect("should deserialise");
        let detections = response.into_detections().expect("should convert");

        assert_eq!(detections[0].bounding_box().max(), (1.0, 0.9));
    }

    #[rstest]
    fn empty_image_result_has_no_detections() {
        let response: AnnotateResponse =
            serde_json::from_str(r#"{"responses": [{}]}"#).expect("should deserialise");

        assert_eq!(response.into_detections(), Ok(Vec::new()));
    }

    #[rstest]
    fn per_image_error_is_a_status_error() {
        let json = r#"{"responses": [{"error": {"code": 3, "message": "Bad image data."}}]}"#;

        let response: AnnotateResponse = serde_json::from_str(json).expect("should deserialise");

        match response.into_detections().expect_err("should fail") {
            ServiceError::Status { message, .. } => assert_eq!(message, "Bad image data."),
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[rstest]
    fn missing_image_result_is_a_parse_error() {
        let response: AnnotateResponse =
            serde_json::from_str("{}").expect("should deserialise");

        assert!(matches!(
            response.into_detections(),
            Err(ServiceError::Parse { .. })
        ));
    }

    #[rstest]
    fn polygon_without_vertices_is_a_parse_error() {
        let json = r#"{
            "responses": [{
                "localizedObjectAnnotations": [
                    {"name": "Sign", "score": 0.5, "boundingPoly": {}}
                ]
            }]
        }"#;

        let response: AnnotateResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(matches!(
            response.into_detections(),
            Err(ServiceError::Parse { .. })
        ));
    }
}
