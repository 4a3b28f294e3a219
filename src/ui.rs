use crate::charts::{AxisUpdate, PaneSnapshot};
use crate::state::DashboardView;
use crate::window::WindowSelector;

const WINDOW_CHOICES: [(&str, &str); 6] = [
    ("", "All time"),
    ("7d", "7 days"),
    ("30d", "30 days"),
    ("3m", "3 months"),
    ("6m", "6 months"),
    ("1y", "1 year"),
];

pub fn render_index(view: &DashboardView) -> String {
    INDEX_HTML
        .replace("{{WINDOW_OPTIONS}}", &window_options(view.window))
        .replace("{{STATS}}", &stat_cells(view))
        .replace("{{CAPTION}}", &escape_html(&view.panel.caption))
        .replace("{{CHARTS}}", &chart_rows(&view.charts))
}

fn window_options(selected: WindowSelector) -> String {
    let selected = selected.to_string();
    let mut options: Vec<String> = WINDOW_CHOICES
        .iter()
        .map(|(value, label)| option(value, label, *value == selected))
        .collect();
    if !WINDOW_CHOICES.iter().any(|(value, _)| *value == selected) {
        options.push(option(&selected, &selected, true));
    }
    options.join("\n")
}

fn option(value: &str, label: &str, selected: bool) -> String {
    let selected = if selected { " selected" } else { "" };
    format!(
        r#"<option value="{}"{selected}>{}</option>"#,
        escape_html(value),
        escape_html(label)
    )
}

fn stat_cells(view: &DashboardView) -> String {
    view.panel
        .cells
        .iter()
        .map(|cell| {
            format!(
                r#"<div class="stat"><span class="label">{}</span><span id="stat-{}" class="value">{}</span></div>"#,
                stat_label(cell.key),
                cell.key,
                escape_html(&cell.text)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn stat_label(key: &str) -> &'static str {
    match key {
        "avg_weight" => "Avg weight (kg)",
        "avg_body_fat" => "Avg body fat (%)",
        "avg_calories" => "Avg calories",
        "avg_steps" => "Avg steps",
        "avg_sleep" => "Avg sleep",
        _ => "",
    }
}

fn chart_rows(charts: &[PaneSnapshot]) -> String {
    charts
        .iter()
        .map(|chart| {
            let points = chart.series.as_ref().map_or(0, |series| series.dates.len());
            let axis = match &chart.axis {
                AxisUpdate::AutoRange => "auto".to_owned(),
                AxisUpdate::Range(range) => format!("{} → {}", range.start, range.end),
            };
            format!(
                r#"<li id="{}"><strong>{}</strong> <span>{points} days</span> <span class="axis">{}</span></li>"#,
                chart.id,
                chart.title,
                escape_html(&axis)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>PhySioLog Trends</title>
  <style>
    body {
      margin: 0;
      background: #1b1b1b;
      color: #e0e0e0;
      font-family: system-ui, sans-serif;
      padding: 32px 18px;
    }

    main {
      width: min(960px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    #statsGrid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 12px;
    }

    .stat {
      background: #252525;
      border-radius: 12px;
      padding: 14px;
      display: grid;
      gap: 6px;
    }

    .stat .label {
      font-size: 0.8rem;
      color: #9a9a9a;
    }

    .stat .value {
      font-size: 1.5rem;
      font-weight: 600;
    }

    #windowMeta {
      color: #9a9a9a;
    }

    ul {
      list-style: none;
      padding: 0;
      display: grid;
      gap: 8px;
    }

    li {
      background: #252525;
      border-radius: 10px;
      padding: 10px 14px;
    }
  </style>
</head>
<body>
  <main>
    <header>
      <h1>Trends</h1>
      <form method="post" action="/window">
        <label for="windowSelect">Window</label>
        <select id="windowSelect" name="window" onchange="this.form.submit()">
{{WINDOW_OPTIONS}}
        </select>
        <noscript><button type="submit">Apply</button></noscript>
      </form>
    </header>

    <section>
      <div id="statsGrid">
{{STATS}}
      </div>
      <p id="windowMeta">{{CAPTION}}</p>
    </section>

    <section>
      <h2>Charts</h2>
      <ul>
{{CHARTS}}
      </ul>
    </section>
  </main>
</body>
</html>
"#;
