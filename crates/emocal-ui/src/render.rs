//! Plain-text rendering of the month grid and the day sheet.

use emocal_calendar::{GRID_COLUMNS, WEEKDAY_LABELS};
use emocal_weather::legend;

use crate::format::{format_precip, format_temp, hour_label, long_date};
use crate::models::{CalendarModel, DayCell, DaySheet};
use crate::query::QueryStatus;

const CELL_WIDTH: usize = 13;
const DIM: &str = "\u{1b}[2m";
const BOLD: &str = "\u{1b}[1m";
const RESET: &str = "\u{1b}[0m";

/// Terminal columns taken by `s`. Pictographs count as two columns and
/// variation selectors as none.
fn display_width(s: &str) -> usize {
    s.chars()
        .map(|c| match c as u32 {
            0xFE00..=0xFE0F | 0x200D => 0,
            0x2600..=0x27BF | 0x1F000..=0x1FAFF => 2,
            _ => 1,
        })
        .sum()
}

fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(s));
    format!("{}{}", s, " ".repeat(fill))
}

fn styled(s: String, style: Option<&str>) -> String {
    match style {
        Some(code) => format!("{}{}{}", code, s, RESET),
        None => s,
    }
}

/// Three lines per cell: date and emoji, high/low, precipitation.
fn cell_lines(cell: &DayCell) -> [String; 3] {
    let marker = if cell.is_selected {
        "*"
    } else if cell.is_today {
        "\u{2022}"
    } else {
        " "
    };
    let day = cell.date.format("%-d").to_string();

    match &cell.entry {
        Some(entry) => [
            format!("{}{:>2} {}", marker, day, cell.category.emoji()),
            format!(
                " {}/{}",
                format_temp(entry.temperature_max),
                format_temp(entry.temperature_min)
            ),
            format!(" {}", format_precip(entry.precipitation_mm)),
        ],
        None => [
            format!("{}{:>2}", marker, day),
            String::new(),
            " No data".to_string(),
        ],
    }
}

pub fn render_calendar(model: &CalendarModel) -> String {
    let color = model.settings().color;
    let mut out = Vec::new();

    let title = model.view().month.label();
    out.push(styled(title, color.then_some(BOLD)));
    out.push(legend());
    for hint in model.hints() {
        out.push(format!("  {}", hint));
    }
    out.push(String::new());

    let header: Vec<String> = WEEKDAY_LABELS
        .iter()
        .map(|label| pad(&format!(" {}", label), CELL_WIDTH))
        .collect();
    out.push(header.join("\u{2502}"));

    let rule = vec!["\u{2500}".repeat(CELL_WIDTH); GRID_COLUMNS].join("\u{253c}");
    let cells = model.cells();
    for week in cells.chunks(GRID_COLUMNS) {
        out.push(rule.clone());
        let rendered: Vec<[String; 3]> = week.iter().map(cell_lines).collect();
        for line in 0..3 {
            let row: Vec<String> = week
                .iter()
                .zip(&rendered)
                .map(|(cell, lines)| {
                    let text = pad(&lines[line], CELL_WIDTH);
                    let dim = color && !cell.in_month;
                    styled(text, dim.then_some(DIM))
                })
                .collect();
            out.push(row.join("\u{2502}"));
        }
    }

    out.join("\n")
}

/// The view state as pretty JSON, for the `state` command.
pub fn render_state(model: &CalendarModel) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(model.view())
}

pub fn render_day_sheet(sheet: &DaySheet) -> String {
    let mut out = Vec::new();

    out.push(format!("{} {}", sheet.category.emoji(), long_date(sheet.date)));
    out.push(sheet.city.clone());
    if let Some(entry) = &sheet.entry {
        out.push(format!(
            "{} \u{b7} High {} \u{b7} Low {} \u{b7} {}",
            sheet.category.description(),
            format_temp(entry.temperature_max),
            format_temp(entry.temperature_min),
            format_precip(entry.precipitation_mm)
        ));
    }
    out.push(String::new());

    match sheet.status {
        QueryStatus::Loading => out.push("Loading hourly forecast\u{2026}".to_string()),
        QueryStatus::Empty => out.push("No hourly data for this day.".to_string()),
        QueryStatus::Error => out.push(format!(
            "Could not load hourly forecast: {}",
            sheet.message.as_deref().unwrap_or("unknown error")
        )),
        QueryStatus::Idle | QueryStatus::Ready => {
            for hour in &sheet.hours {
                let precip = hour
                    .precipitation_probability
                    .map(|p| format!("{}%", p))
                    .unwrap_or_else(|| "--".to_string());
                let wind = hour
                    .wind_speed
                    .map(|w| format!("{:.0} km/h", w))
                    .unwrap_or_else(|| "--".to_string());
                out.push(format!(
                    "{:>4}  {}  {:>4}  {:>4}  {}",
                    hour_label(hour.time),
                    pad(hour.category.emoji(), 4),
                    format_temp(hour.temperature),
                    precip,
                    wind
                ));
            }
        }
    }

    out.join("\n")
}
