//! The document handed to the browser-side display.

use scene::{Scene, SceneSnapshot};
use serde::Serialize;

/// Interaction widgets the display enables on every panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InteractionOptions {
    pub orientation_widget: bool,
    pub interactive_orientation_widget: bool,
}

impl Default for InteractionOptions {
    fn default() -> Self {
        Self {
            orientation_widget: true,
            interactive_orientation_widget: true,
        }
    }
}

/// Ephemeral render request; nothing about it is stored.
#[derive(Debug, Clone, Serialize)]
pub struct RenderRequest {
    pub scene: SceneSnapshot,
    pub size: (u32, u32),
    pub interaction: InteractionOptions,
}

impl RenderRequest {
    pub fn for_scene(scene: &Scene) -> Self {
        Self {
            scene: scene.snapshot(),
            size: scene.window_size(),
            interaction: InteractionOptions::default(),
        }
    }
}

/// Progress stages reported while a render is prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStage {
    Building,
    Sending,
    Ready,
}

impl RenderStage {
    pub fn label(&self) -> &'static str {
        match self {
            RenderStage::Building => "Building scene...",
            RenderStage::Sending => "Sending to display...",
            RenderStage::Ready => "Ready!",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: RenderStage,
    pub label: &'static str,
    pub elapsed_ms: u64,
}

impl StageReport {
    pub fn new(stage: RenderStage, elapsed_ms: u64) -> Self {
        Self {
            stage,
            label: stage.label(),
            elapsed_ms,
        }
    }
}

/// Response body of a render call.
#[derive(Debug, Clone, Serialize)]
pub struct RenderResponse {
    pub session_id: String,
    pub scene_key: String,
    /// The session had already rendered this scene
    pub already_rendered: bool,
    pub stages: Vec<StageReport>,
    pub request: RenderRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_defaults() {
        let json = serde_json::to_value(InteractionOptions::default()).unwrap();
        assert_eq!(json["orientation_widget"], true);
        assert_eq!(json["interactive_orientation_widget"], true);
    }

    #[test]
    fn test_stage_labels() {
        let report = StageReport::new(RenderStage::Ready, 12);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["stage"], "ready");
        assert_eq!(json["label"], "Ready!");
        assert_eq!(json["elapsed_ms"], 12);
    }
}
