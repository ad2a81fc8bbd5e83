use serde::Deserialize;
use tubesheet_renderer::ir::{LegSelection, PlanSource};
use tubesheet_renderer::{Config, Theme, read_plan, render_with_config};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TubesheetRenderOptions {
    theme: Option<String>,
    leg: Option<LegSelection>,
    tube_od: Option<f32>,
    channel_half_width: Option<f32>,
    font_size: Option<f32>,
    delimiter: Option<char>,
    guide_lines: Option<bool>,
    /// Plan name to plan table text, applied in array order.
    plans: Option<Vec<(String, String)>>,
}

fn build_config(options: &TubesheetRenderOptions) -> Config {
    let mut config = Config::default();
    if options.theme.as_deref() == Some("modern") {
        config.theme = Theme::modern();
    }
    if let Some(leg) = options.leg {
        config.layout.leg = leg;
    }
    if let Some(tube_od) = options.tube_od {
        config.layout.tube_od = tube_od;
    }
    if let Some(half_width) = options.channel_half_width {
        config.layout.channel_half_width = half_width;
    }
    if let Some(font_size) = options.font_size {
        config.theme.font_size = font_size;
    }
    if let Some(delimiter) = options.delimiter {
        config.input.delimiter = delimiter;
    }
    if let Some(guide_lines) = options.guide_lines {
        config.layout.guide_lines = guide_lines;
    }
    config
}

fn render(table: &str, options: TubesheetRenderOptions) -> Result<String, String> {
    let config = build_config(&options);
    let plans = options
        .plans
        .unwrap_or_default()
        .iter()
        .map(|(name, text)| read_plan(name, text, config.input.delimiter))
        .collect::<Result<Vec<PlanSource>, _>>()
        .map_err(|error| error.to_string())?;
    render_with_config(table, &plans, &config).map_err(|error| error.to_string())
}

#[wasm_bindgen]
pub fn render_tubesheet_svg(table: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<TubesheetRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        TubesheetRenderOptions::default()
    };

    render(table, options).map_err(|error| JsValue::from_str(&error))
}

#[cfg(test)]
mod tests {
    use crate::{TubesheetRenderOptions, render};

    #[test]
    fn renders_both_legs_with_a_plan() {
        let table = "x_label;y_label;cl_x;cl_y;hl_x;hl_y;tube_id
A;1;0;1;0;1;TUBE_0001
B;1;1;1;1;1;TUBE_0002";
        let options = TubesheetRenderOptions {
            leg: Some(tubesheet_renderer::LegSelection::Both),
            channel_half_width: Some(0.5),
            plans: Some(vec![(
                "outage".to_string(),
                "ROW;COL;TUBE\n1;A;TUBE_0001".to_string(),
            )]),
            ..Default::default()
        };

        let svg = render(table, options).expect("tubesheet should render");

        assert!(svg.contains("<svg"));
        assert!(svg.contains("id=\"cl1\""));
        assert!(svg.contains("data-plan=\"outage\""));
    }
}
