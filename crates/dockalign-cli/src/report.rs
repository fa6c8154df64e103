//! Human-readable and JSON rendering of solver results.

use colored::Colorize;
use dockalign_perception::{SceneReport, TurningAngles};
use dockalign_types::ManeuverStep;
use nalgebra::{Point3, Vector2, Vector3};
use serde::Serialize;

/// JSON shape printed by `solve` and `sensor`.
#[derive(Debug, Serialize)]
pub struct SolveOutput<'a> {
    pub angles: &'a TurningAngles,
    pub plan: Vec<ManeuverStep>,
}

fn fmt_point(p: &Point3<f64>) -> String {
    format!("[{:.3}, {:.3}, {:.3}]", p.x, p.y, p.z)
}

fn fmt_vec3(v: &Vector3<f64>) -> String {
    format!("[{:.3}, {:.3}, {:.3}]", v.x, v.y, v.z)
}

fn fmt_vec2(v: &Vector2<f64>) -> String {
    format!("[{:.3}, {:.3}]", v.x, v.y)
}

fn fmt_step(step: &ManeuverStep) -> String {
    match step {
        ManeuverStep::Turn { degrees } if *degrees >= 0.0 => {
            format!("turn {:.1}° counter-clockwise", degrees)
        }
        ManeuverStep::Turn { degrees } => format!("turn {:.1}° clockwise", degrees.abs()),
        ManeuverStep::Drive { distance } => format!("drive {:.2} m forward", distance),
    }
}

/// The angle diagram as text: forward axis, POI direction (alpha) and
/// inverted surface normal (beta), followed by the turn procedure.
pub fn render_angles(angles: &TurningAngles) -> String {
    let mut out = String::new();
    out.push_str(&format!("  {}\n", "Angle diagram (wheel chair frame)".bold()));
    out.push_str(&format!("    forward          {}\n", fmt_vec2(&Vector2::new(0.0, 1.0)).green()));
    out.push_str(&format!(
        "    to POI           {}   alpha = {:.1}°\n",
        fmt_vec2(&angles.poi_direction_unit).blue(),
        angles.alpha
    ));
    out.push_str(&format!(
        "    inverted normal  {}   beta  = {:.1}°\n",
        fmt_vec2(&angles.inverted_normal).red(),
        angles.beta
    ));
    out.push('\n');
    out.push_str(&format!("  {}\n", "Turn procedure".bold()));
    for (i, step) in angles.plan().iter().enumerate() {
        out.push_str(&format!("    {}. {}\n", i + 1, fmt_step(step)));
    }
    out
}

pub fn render_scene(report: &SceneReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("  {}\n", "Scene".bold()));
    out.push_str(&format!("    POI, world frame           {}\n", fmt_point(&report.poi_world)));
    out.push_str(&format!(
        "    POI, sensor frame          {}\n",
        fmt_point(&report.sensor_measurement.poi)
    ));
    out.push_str(&format!(
        "    POI, wheel chair frame     {}\n",
        fmt_point(&report.wheel_chair_target.poi)
    ));
    out.push_str(&format!(
        "    normal, wheel chair frame  {}\n",
        fmt_vec3(&report.wheel_chair_target.normal)
    ));
    out.push_str(&format!(
        "    derivation gap             {}\n",
        format!("{:.2e} m", report.derivation_gap).dimmed()
    ));
    out.push('\n');
    out.push_str(&render_angles(&report.angles));
    out
}

pub fn angles_json(angles: &TurningAngles) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&SolveOutput {
        angles,
        plan: angles.plan(),
    })
}

pub fn scene_json(report: &SceneReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockalign_perception::compute_turning_angles;

    fn right_turn() -> TurningAngles {
        compute_turning_angles(Point3::new(1.0, 0.0, 0.0), Vector3::new(0.0, -1.0, 0.0)).unwrap()
    }

    #[test]
    fn render_angles_lists_turn_procedure() {
        colored::control::set_override(false);
        let text = render_angles(&right_turn());
        assert!(text.contains("alpha = -90.0°"));
        assert!(text.contains("beta  = 0.0°"));
        assert!(text.contains("1. turn 90.0° clockwise"));
        assert!(text.contains("2. drive 1.00 m forward"));
        assert!(text.contains("3. turn 90.0° counter-clockwise"));
    }

    #[test]
    fn angles_json_includes_plan() {
        let json = angles_json(&right_turn()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["plan"].as_array().map(Vec::len), Some(3));
        assert_eq!(value["plan"][1]["action"], "Drive");
        assert!((value["angles"]["alpha"].as_f64().unwrap() + 90.0).abs() < 1e-9);
    }
}
