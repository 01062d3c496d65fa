//! Built-in rituals, one per style family
//!
//! | Family       | Ritual    | Last phase |
//! |--------------|-----------|------------|
//! | Letters      | `seal`    | 600 ms     |
//! | Photographic | `shutter` | 520 ms     |
//! | Ticket       | `print`   | 700 ms     |
//! | Collectible  | `flip`    | 800 ms     |
//! | Haute        | `unlock`  | 950 ms     |
//!
//! Property names are shared with hosts that sample the [`Stage`]. Scales
//! are unitless, angles are in degrees.

use super::{Comparison, Condition, Easing, Mutation, Phase, Ritual, Stage, Transition};
use crate::feedback::FeedbackEvent;
use crate::model::{ArtifactStyle, StyleFamily};

/// Ritual played when minting a style
#[must_use]
pub fn ritual_for(style: ArtifactStyle) -> Ritual {
    ritual_for_family(style.family())
}

/// Ritual shared by a family
#[must_use]
pub fn ritual_for_family(family: StyleFamily) -> Ritual {
    match family {
        StyleFamily::Letters => seal(),
        StyleFamily::Photographic => shutter(),
        StyleFamily::Ticket => print(),
        StyleFamily::Collectible => flip(),
        StyleFamily::Haute => unlock(),
    }
}

/// Stage in its resting pose for a family's ritual
#[must_use]
pub fn prepare_stage(family: StyleFamily) -> Stage {
    let stage = Stage::new();
    stage.set_initial("scale", 1.0);
    match family {
        StyleFamily::Letters => {
            stage.set_initial("seal_opacity", 0.0);
            stage.set_initial("seal_scale", 1.6);
        }
        StyleFamily::Photographic => {
            stage.set_initial("shutter_open", 0.0);
            stage.set_initial("flash_opacity", 0.0);
            stage.set_initial("print_offset", 0.0);
        }
        StyleFamily::Ticket => stage.set_initial("paper_offset", 0.0),
        StyleFamily::Collectible => stage.set_initial("rotation", 0.0),
        StyleFamily::Haute => {
            stage.set_initial("dial_angle", 0.0);
            stage.set_initial("door_open", 0.0);
        }
    }
    stage
}

/// Press, drip wax, stamp, settle
#[must_use]
pub fn seal() -> Ritual {
    Ritual::new(
        "seal",
        vec![
            Phase::at_ms("press", 0)
                .set("scale", 0.96, Transition::ms(120, Easing::EaseOut))
                .feedback(FeedbackEvent::HeavyImpact),
            Phase::at_ms("drip", 120).set("seal_opacity", 1.0, Transition::ms(230, Easing::EaseIn)),
            Phase::at_ms("stamp", 350)
                .set("seal_scale", 1.0, Transition::ms(250, Easing::EaseOutBack))
                .feedback(FeedbackEvent::MediumImpact),
            Phase::at_ms("settle", 600)
                .set("scale", 1.0, Transition::ms(200, Easing::EaseOutCubic))
                .set("sealed", true, Transition::SNAP)
                .feedback(FeedbackEvent::Success),
        ],
    )
}

/// Open, flash, close, eject the print
#[must_use]
pub fn shutter() -> Ritual {
    Ritual::new(
        "shutter",
        vec![
            Phase::at_ms("open", 0)
                .set("shutter_open", 1.0, Transition::ms(80, Easing::EaseOut))
                .feedback(FeedbackEvent::LightImpact),
            Phase::at_ms("flash", 80)
                .set("flash_opacity", 1.0, Transition::SNAP)
                .feedback(FeedbackEvent::Sound("shutter".to_string())),
            Phase::at_ms("close", 260)
                .set("shutter_open", 0.0, Transition::ms(120, Easing::EaseIn))
                .set("flash_opacity", 0.0, Transition::ms(200, Easing::EaseOut))
                .feedback(FeedbackEvent::RigidImpact),
            Phase::at_ms("eject", 520)
                .set("print_offset", 1.0, Transition::ms(400, Easing::EaseOutCubic))
                .feedback(FeedbackEvent::Success),
        ],
    )
}

/// Feed paper in steps, then tear
#[must_use]
pub fn print() -> Ritual {
    let mut phases = vec![Phase::at_ms("start", 0).feedback(FeedbackEvent::MediumImpact)];
    for (i, at) in [150_u64, 300, 450].into_iter().enumerate() {
        let offset = (i + 1) as f32 / 3.0;
        phases.push(
            Phase::at_ms(format!("feed{}", i + 1), at)
                .set("paper_offset", offset, Transition::ms(120, Easing::Linear))
                .feedback(FeedbackEvent::SoftImpact),
        );
    }
    phases.push(
        Phase::at_ms("tear", 700)
            .set("torn", true, Transition::SNAP)
            .feedback(FeedbackEvent::Sound("tear".to_string())),
    );
    Ritual::new("print", phases)
}

/// Lift, turn over, land, settle
#[must_use]
pub fn flip() -> Ritual {
    Ritual::new(
        "flip",
        vec![
            Phase::at_ms("lift", 0)
                .set("scale", 1.05, Transition::ms(180, Easing::EaseOut))
                .feedback(FeedbackEvent::LightImpact),
            Phase::at_ms("turn", 180).set("rotation", 180.0, Transition::ms(400, Easing::EaseInOutCubic)),
            Phase::at_ms("land", 580)
                .set("scale", 1.0, Transition::ms(160, Easing::EaseOutBounce))
                .feedback(FeedbackEvent::RigidImpact),
            Phase::at_ms("settle", 800).feedback(FeedbackEvent::Success),
        ],
    )
}

/// Turn the dial twice, then open the door if it reached the mark
#[must_use]
pub fn unlock() -> Ritual {
    Ritual::new(
        "unlock",
        vec![
            Phase::at_ms("grip", 0)
                .set("scale", 0.98, Transition::ms(100, Easing::EaseOut))
                .feedback(FeedbackEvent::HeavyImpact),
            Phase::at_ms("turn1", 200)
                .set("dial_angle", 120.0, Transition::ms(220, Easing::EaseInOut))
                .feedback(FeedbackEvent::SelectionChanged),
            Phase::at_ms("turn2", 450)
                .set("dial_angle", 240.0, Transition::ms(220, Easing::EaseInOut))
                .feedback(FeedbackEvent::SelectionChanged),
            Phase::at_ms("release", 700)
                .branch(
                    Condition::new("dial_angle", Comparison::AtLeast(240.0)),
                    vec![
                        Mutation::new("door_open", 1.0, Transition::ms(250, Easing::EaseOutBack)),
                        Mutation::new("scale", 1.0, Transition::ms(250, Easing::EaseOut)),
                    ],
                    vec![Mutation::new("shake", 1.0, Transition::ms(250, Easing::EaseOutElastic))],
                )
                .feedback(FeedbackEvent::RigidImpact),
            Phase::at_ms("settle", 950).feedback(FeedbackEvent::Success),
        ],
    )
}
