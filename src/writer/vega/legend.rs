//! Color legend and legend-driven selection
//!
//! A symbol legend is added when the document has a `color` scale and the data
//! has more than one color level. In interactive mode the legend also drives a
//! small selection state machine:
//!
//! ```text
//! click legend entry          -> selected = {entry}
//! shift+click legend entry    -> toggle entry in selected
//! mouseup on empty canvas     -> selected = {}
//! ```
//!
//! Color-bound marks then show their category color only while their group is
//! selected (or nothing is), and fade to grey otherwise.

use serde_json::{json, Map, Value};

use super::spec::{DataSource, Legend, Mark, Signal, VisualizationSpec};
use crate::naming;
use crate::plot::scale::DESELECTED_COLOR;
use crate::reader::ProjectedData;

/// Opacity of marks outside the selection
const DESELECTED_OPACITY: f64 = 0.2;

/// Opacity of legend entries outside the selection
const DESELECTED_LEGEND_OPACITY: f64 = 0.25;

/// Channels rewritten when bound to the color scale
const COLOR_CHANNELS: &[&str] = &["fill", "stroke"];

/// Add the color legend, and the selection machinery when `interactive`
pub fn augment(
    spec: &mut VisualizationSpec,
    data: &ProjectedData,
    title: Option<String>,
    interactive: bool,
) {
    if spec.scale(naming::COLOR_SCALE).is_none() || data.color_levels.len() < 2 {
        return;
    }

    if !interactive {
        spec.legends.push(Legend {
            fill: naming::COLOR_SCALE.to_string(),
            title,
            encode: None,
        });
        return;
    }

    spec.legends.push(Legend {
        fill: naming::COLOR_SCALE.to_string(),
        title,
        encode: Some(legend_encode()),
    });
    spec.signals.extend(selection_signals());
    spec.data.push(selected_data());
    for mark in &mut spec.marks {
        highlight_selection(mark);
    }
}

/// Test passing for rows in the selection, or for every row when it is empty
fn selection_test(field: &str) -> String {
    format!(
        "!length(data('{0}')) || indata('{0}', 'value', {1})",
        naming::SELECTED_DATA,
        naming::datum(field)
    )
}

fn legend_click_events() -> String {
    format!(
        "@{}:click, @{}:click",
        naming::LEGEND_SYMBOL,
        naming::LEGEND_LABEL
    )
}

fn legend_encode() -> Value {
    let opacity = json!([
        { "test": selection_test("value"), "value": 1.0 },
        { "value": DESELECTED_LEGEND_OPACITY }
    ]);
    json!({
        "symbols": {
            "name": naming::LEGEND_SYMBOL,
            "interactive": true,
            "update": { "opacity": opacity.clone() }
        },
        "labels": {
            "name": naming::LEGEND_LABEL,
            "interactive": true,
            "update": { "opacity": opacity }
        }
    })
}

fn selection_signals() -> Vec<Signal> {
    vec![
        Signal {
            name: naming::CLEAR_SIGNAL.to_string(),
            value: json!(true),
            on: vec![json!({
                "events": "mouseup[!event.item]",
                "update": "true",
                "force": true
            })],
        },
        Signal {
            name: naming::SHIFT_SIGNAL.to_string(),
            value: json!(false),
            on: vec![json!({
                "events": legend_click_events(),
                "update": "event.shiftKey",
                "force": true
            })],
        },
        Signal {
            name: naming::CLICKED_SIGNAL.to_string(),
            value: Value::Null,
            on: vec![json!({
                "events": legend_click_events(),
                "update": "{value: datum.value}",
                "force": true
            })],
        },
    ]
}

fn selected_data() -> DataSource {
    let clicked = naming::CLICKED_SIGNAL;
    let shift = naming::SHIFT_SIGNAL;
    DataSource::empty(naming::SELECTED_DATA).with_on(vec![
        json!({ "trigger": naming::CLEAR_SIGNAL, "remove": true }),
        json!({ "trigger": format!("!{}", shift), "remove": true }),
        json!({ "trigger": format!("!{} && {}", shift, clicked), "insert": clicked }),
        json!({ "trigger": format!("{} && {}", shift, clicked), "toggle": clicked }),
    ])
}

fn is_color_binding(value: &Value) -> bool {
    value.get("scale").and_then(Value::as_str) == Some(naming::COLOR_SCALE)
        && value.get("field").and_then(Value::as_str) == Some(naming::COLOR_FIELD)
}

/// Move color bindings into `update` behind the selection test, recursively
///
/// A mark keeps the opacity it was built with while selected.
fn highlight_selection(mark: &mut Mark) {
    let enter: &mut Map<String, Value> = &mut mark.encode.enter;
    let bound: Vec<&str> = COLOR_CHANNELS
        .iter()
        .copied()
        .filter(|c| enter.get(*c).is_some_and(is_color_binding))
        .collect();

    if !bound.is_empty() {
        let test = selection_test(naming::COLOR_FIELD);
        for channel in bound {
            enter.remove(channel);
            mark.encode.update.insert(
                channel.to_string(),
                json!([
                    { "test": test, "scale": naming::COLOR_SCALE, "field": naming::COLOR_FIELD },
                    { "value": DESELECTED_COLOR }
                ]),
            );
        }
        let selected_opacity = mark
            .encode
            .enter
            .remove("opacity")
            .and_then(|v| v.get("value").and_then(Value::as_f64))
            .unwrap_or(1.0);
        mark.encode.update.insert(
            "opacity".to_string(),
            json!([
                { "test": test, "value": selected_opacity },
                { "value": DESELECTED_OPACITY }
            ]),
        );
    }

    for child in &mut mark.marks {
        highlight_selection(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::scale::{color_scale, Palette};
    use crate::plot::Bindings;
    use crate::reader::project;
    use crate::writer::vega::MarkKind;
    use polars::prelude::*;

    fn grouped() -> ProjectedData {
        let df = df! {
            "x" => [1.0, 2.0, 3.0],
            "y" => [1.0, 2.0, 3.0],
            "g" => ["A", "B", "A"],
        }
        .unwrap();
        project(&df, &Bindings::xy("x", "y").with_color("g")).unwrap()
    }

    fn spec_with_color(data: &ProjectedData, marks: Vec<Mark>) -> VisualizationSpec {
        let mut spec = VisualizationSpec::new(400, 300);
        spec.scales
            .push(color_scale(&data.color_levels, &Palette::default()));
        spec.marks = marks;
        spec
    }

    fn colored_symbol() -> Mark {
        Mark::new(MarkKind::Symbol)
            .from_data(naming::TABLE_DATA)
            .enter("fill", json!({"scale": "color", "field": "color"}))
            .enter("opacity", json!({"value": 0.6}))
    }

    #[test]
    fn test_static_legend() {
        let data = grouped();
        let mut spec = spec_with_color(&data, vec![colored_symbol()]);
        augment(&mut spec, &data, Some("Group".to_string()), false);
        assert_eq!(spec.legends.len(), 1);
        assert_eq!(spec.legends[0].title.as_deref(), Some("Group"));
        assert!(spec.legends[0].encode.is_none());
        assert!(spec.signals.is_empty());
        assert!(spec.marks[0].encode.update.is_empty());
    }

    #[test]
    fn test_no_legend_without_color_scale() {
        let data = grouped();
        let mut spec = VisualizationSpec::new(400, 300);
        augment(&mut spec, &data, None, true);
        assert!(spec.legends.is_empty());
        assert!(spec.signals.is_empty());
    }

    #[test]
    fn test_selection_state_machine() {
        let data = grouped();
        let mut spec = spec_with_color(&data, vec![colored_symbol()]);
        augment(&mut spec, &data, None, true);

        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(
            json["signals"][0],
            json!({
                "name": "clear",
                "value": true,
                "on": [{"events": "mouseup[!event.item]", "update": "true", "force": true}]
            })
        );
        assert_eq!(
            json["signals"][1]["on"][0]["events"],
            "@legendSymbol:click, @legendLabel:click"
        );
        assert_eq!(json["signals"][2]["value"], Value::Null);

        let selected = spec.data_source("selected").unwrap();
        let triggers: Vec<&str> = selected
            .on
            .iter()
            .map(|t| t["trigger"].as_str().unwrap())
            .collect();
        assert_eq!(triggers, vec!["clear", "!shift", "!shift && clicked", "shift && clicked"]);
        assert_eq!(selected.on[3]["toggle"], "clicked");

        assert_eq!(json["legends"][0]["encode"]["symbols"]["name"], "legendSymbol");
        assert_eq!(json["legends"][0]["encode"]["labels"]["interactive"], true);
    }

    #[test]
    fn test_color_bindings_move_to_update() {
        let data = grouped();
        let group = Mark::new(MarkKind::Group)
            .from_facet("series_0_facet", naming::TABLE_DATA, &["color"])
            .with_marks(vec![Mark::new(MarkKind::Line)
                .from_data("series_0_facet")
                .enter("stroke", json!({"scale": "color", "field": "color"}))]);
        let fixed = Mark::new(MarkKind::Rule).enter("stroke", json!({"value": "#444444"}));
        let mut spec = spec_with_color(&data, vec![colored_symbol(), group, fixed]);
        augment(&mut spec, &data, None, true);

        let symbol = &spec.marks[0].encode;
        assert!(symbol.enter.get("fill").is_none());
        let fill = &symbol.update["fill"];
        assert_eq!(
            fill[0]["test"],
            "!length(data('selected')) || indata('selected', 'value', datum.color)"
        );
        assert_eq!(fill[1]["value"], "#cccccc");
        assert_eq!(symbol.update["opacity"][0]["value"], json!(0.6));
        assert_eq!(symbol.update["opacity"][1]["value"], json!(0.2));

        let line = &spec.marks[1].marks[0].encode;
        assert!(line.update.contains_key("stroke"));
        assert_eq!(line.update["opacity"][0]["value"], json!(1.0));

        assert!(spec.marks[2].encode.update.is_empty());
    }
}
