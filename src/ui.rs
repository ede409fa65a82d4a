use crate::models::{DashboardView, LatestSummary, StatCard, Trend};

const OPTION_LABEL_LIMIT: usize = 80;

pub fn render_index(view: &DashboardView) -> String {
    fill_template(
        INDEX_HTML,
        &[
            ("{{OPTIONS}}", render_options(view)),
            ("{{BODY}}", render_body(view)),
            ("{{VIEW_JSON}}", view_json(view)),
        ],
    )
}

// Slots are filled left to right in one pass; inserted text is never rescanned.
fn fill_template(template: &str, slots: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match slots.iter().find(|(key, _)| tail.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push_str("{{");
                rest = &tail[2..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn render_options(view: &DashboardView) -> String {
    let mut out = String::new();
    for product in &view.products {
        let selected = if view.selected.as_deref() == Some(product.as_str()) {
            " selected"
        } else {
            ""
        };
        out.push_str(&format!(
            "<option value=\"{}\"{selected}>{}</option>",
            escape_html(product),
            escape_html(&option_label(product))
        ));
    }
    out
}

fn render_body(view: &DashboardView) -> String {
    if view.loading {
        return "<div class=\"spinner\" aria-label=\"Loading\"></div>".to_string();
    }
    if view.selected.is_none() || view.series.is_empty() {
        return "<p class=\"hint\">No snapshots to show yet.</p>".to_string();
    }

    let mut out = String::new();
    if let (Some(cards), Some(_)) = (&view.stats, &view.latest) {
        out.push_str("<section class=\"cards\">");
        for card in cards {
            out.push_str(&render_card(card));
        }
        out.push_str("</section>");
    }

    out.push_str("<section class=\"charts\">");
    for (id, title) in CHARTS {
        out.push_str(&format!(
            "<div class=\"chart-card\"><h2>{title}</h2><svg id=\"chart-{id}\" viewBox=\"0 0 600 260\" role=\"img\" aria-label=\"{title}\"></svg></div>"
        ));
    }
    out.push_str("</section>");

    if let Some(latest) = &view.latest {
        out.push_str(&render_product_info(latest));
    }
    out
}

const CHARTS: [(&str, &str); 4] = [
    ("price", "Price history"),
    ("review_count", "Review count history"),
    ("rating_value", "Rating history"),
    ("rank", "Rank history"),
];

fn render_card(card: &StatCard) -> String {
    let (class, arrow) = match card.trend {
        Trend::Up => ("up", "&#9650;"),
        Trend::Down => ("down", "&#9660;"),
        Trend::Neutral => ("neutral", ""),
    };
    format!(
        "<div class=\"stat\"><div class=\"change {class}\">{arrow} {}%</div><span class=\"label\">{}</span><span class=\"value\">{}</span></div>",
        escape_html(&card.change),
        escape_html(&card.title),
        escape_html(&card.value)
    )
}

fn render_product_info(latest: &LatestSummary) -> String {
    let mut out = String::from("<section class=\"info\"><h2>Product</h2>");
    out.push_str(&format!(
        "<p><span class=\"label\">Name</span> {}</p>",
        escape_html(&latest.name)
    ));
    out.push_str(&format!(
        "<p><span class=\"label\">Platform</span> {}</p>",
        escape_html(&latest.platform)
    ));
    out.push_str(&format!(
        "<p><span class=\"label\">Last updated</span> {}</p>",
        escape_html(&latest.last_updated)
    ));
    if let Some(url) = &latest.url {
        out.push_str(&format!(
            "<p><span class=\"label\">URL</span> <a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">Open product page</a></p>",
            escape_html(url)
        ));
    }
    out.push_str("</section>");
    out
}

pub fn option_label(name: &str) -> String {
    if name.chars().count() > OPTION_LABEL_LIMIT {
        let head: String = name.chars().take(OPTION_LABEL_LIMIT).collect();
        format!("{head}...")
    } else {
        name.to_string()
    }
}

// Embedded inside <script>. Markup characters only occur inside JSON strings,
// so unicode escapes keep the value intact and the tag unbroken.
fn view_json(view: &DashboardView) -> String {
    serde_json::to_string(view)
        .unwrap_or_else(|_| "null".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Product Tracking Dashboard</title>
  <style>
    :root {
      --bg: #f6f7f9;
      --card: #ffffff;
      --ink: #1f2933;
      --muted: #616e7c;
      --line: #e4e7eb;
      --up: #16a34a;
      --down: #dc2626;
      --neutral: #6b7280;
      --shadow: 0 6px 18px rgba(31, 41, 51, 0.08);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      padding: 24px 16px 48px;
    }

    .app {
      max-width: 1200px;
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    h1 {
      margin: 0 0 6px;
      font-size: clamp(1.6rem, 3vw, 2.2rem);
    }

    h2 {
      margin: 0 0 12px;
      font-size: 1.05rem;
    }

    .subtitle,
    .hint {
      margin: 0;
      color: var(--muted);
    }

    select {
      width: 100%;
      max-width: 480px;
      padding: 10px 12px;
      border: 1px solid #cbd2d9;
      border-radius: 8px;
      background: white;
      font-size: 0.95rem;
    }

    .cards {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 16px;
    }

    .stat,
    .chart-card,
    .info {
      background: var(--card);
      border: 1px solid var(--line);
      border-radius: 12px;
      box-shadow: var(--shadow);
      padding: 18px;
    }

    .stat {
      display: grid;
      gap: 6px;
    }

    .stat .label,
    .info .label {
      font-size: 0.85rem;
      color: var(--muted);
      font-weight: 600;
    }

    .stat .value {
      font-size: 1.6rem;
      font-weight: 700;
    }

    .change {
      justify-self: end;
      font-size: 0.85rem;
      font-weight: 600;
    }

    .change.up {
      color: var(--up);
    }

    .change.down {
      color: var(--down);
    }

    .change.neutral {
      color: var(--neutral);
    }

    .charts {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(460px, 1fr));
      gap: 16px;
    }

    svg text {
      font-size: 11px;
      fill: #666;
    }

    .chart-grid {
      stroke: #f0f0f0;
      stroke-dasharray: 3 3;
    }

    .chart-line {
      fill: none;
      stroke-width: 3;
    }

    .info p {
      margin: 6px 0;
    }

    .info a {
      color: #2563eb;
    }

    .status {
      min-height: 1.2em;
      color: var(--down);
    }

    .spinner {
      width: 96px;
      height: 96px;
      margin: 48px auto;
      border-radius: 50%;
      border-bottom: 3px solid #3b82f6;
      animation: spin 900ms linear infinite;
    }

    @keyframes spin {
      to {
        transform: rotate(360deg);
      }
    }

    @media (max-width: 600px) {
      .charts {
        grid-template-columns: 1fr;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Product Tracking Dashboard</h1>
      <p class="subtitle">Price, reviews, rating and rank over time.</p>
    </header>

    <section>
      <label for="product" class="hint">Product</label><br />
      <select id="product">{{OPTIONS}}</select>
    </section>

    <div class="status" id="status"></div>
    <div id="body">{{BODY}}</div>
  </main>

  <script>
    const initialView = {{VIEW_JSON}};
    const bodyEl = document.getElementById('body');
    const statusEl = document.getElementById('status');
    const selectEl = document.getElementById('product');

    const CHARTS = [
      { key: 'price', title: 'Price history', kind: 'line', color: '#10b981', format: (v) => `¥${v.toLocaleString()}` },
      { key: 'review_count', title: 'Review count history', kind: 'bar', color: '#3b82f6', format: (v) => v.toLocaleString() },
      { key: 'rating_value', title: 'Rating history', kind: 'line', color: '#f59e0b', format: (v) => v.toFixed(2), domain: [0, 5] },
      { key: 'rank', title: 'Rank history', kind: 'line', color: '#8b5cf6', format: (v) => `#${Math.round(v)}`, reversed: true }
    ];

    const escapeHtml = (text) => String(text)
      .replace(/&/g, '&amp;')
      .replace(/</g, '&lt;')
      .replace(/>/g, '&gt;')
      .replace(/"/g, '&quot;')
      .replace(/'/g, '&#39;');

    const setStatus = (message) => {
      statusEl.textContent = message || '';
    };

    const renderChart = (svg, points, chart) => {
      if (!points.length) {
        svg.innerHTML = '<text x="50%" y="50%" text-anchor="middle">No data yet</text>';
        return;
      }

      const width = 600;
      const height = 260;
      const left = 64;
      const right = 16;
      const top = 16;
      const bottom = 34;

      const values = points.map((point) => point[chart.key]);
      let [min, max] = chart.domain || [Math.min(...values), Math.max(...values)];
      if (chart.kind === 'bar') {
        min = Math.min(min, 0);
      }
      if (min === max) {
        min -= 1;
        max += 1;
      }

      const plotWidth = width - left - right;
      const plotHeight = height - top - bottom;
      const slot = plotWidth / points.length;
      const x = (index) => left + slot * index + slot / 2;
      const y = (value) => {
        const ratio = (value - min) / (max - min);
        return chart.reversed ? top + ratio * plotHeight : top + plotHeight - ratio * plotHeight;
      };

      let grid = '';
      const ticks = 4;
      for (let i = 0; i <= ticks; i += 1) {
        const value = min + ((max - min) * i) / ticks;
        const yPos = y(value).toFixed(2);
        grid += `<line class="chart-grid" x1="${left}" y1="${yPos}" x2="${width - right}" y2="${yPos}" />`;
        grid += `<text x="${left - 8}" y="${Number(yPos) + 4}" text-anchor="end">${escapeHtml(chart.format(value))}</text>`;
      }

      const labelEvery = Math.max(1, Math.ceil(points.length / 8));
      const labels = points
        .map((point, index) => index % labelEvery === 0
          ? `<text x="${x(index)}" y="${height - 12}" text-anchor="middle">${escapeHtml(point.date)}</text>`
          : '')
        .join('');

      let marks = '';
      if (chart.kind === 'bar') {
        const barWidth = Math.max(2, slot * 0.7);
        marks = points
          .map((point, index) => {
            const yTop = y(point[chart.key]);
            const yBase = y(min);
            return `<rect x="${(x(index) - barWidth / 2).toFixed(2)}" y="${yTop.toFixed(2)}" width="${barWidth.toFixed(2)}" height="${Math.max(0, yBase - yTop).toFixed(2)}" rx="4" fill="${chart.color}"><title>${escapeHtml(point.date)}: ${escapeHtml(chart.format(point[chart.key]))}</title></rect>`;
          })
          .join('');
      } else {
        const path = points
          .map((point, index) => `${index === 0 ? 'M' : 'L'} ${x(index).toFixed(2)} ${y(point[chart.key]).toFixed(2)}`)
          .join(' ');
        const dots = points
          .map((point, index) => `<circle cx="${x(index).toFixed(2)}" cy="${y(point[chart.key]).toFixed(2)}" r="4" fill="${chart.color}"><title>${escapeHtml(point.date)}: ${escapeHtml(chart.format(point[chart.key]))}</title></circle>`)
          .join('');
        marks = `<path class="chart-line" stroke="${chart.color}" d="${path}" />${dots}`;
      }

      svg.innerHTML = `${grid}${marks}${labels}`;
    };

    const renderCards = (view) => {
      if (!view.stats || !view.latest) {
        return '';
      }
      const cards = view.stats.map((card) => {
        const arrow = card.trend === 'up' ? '&#9650;' : card.trend === 'down' ? '&#9660;' : '';
        return `<div class="stat"><div class="change ${card.trend}">${arrow} ${escapeHtml(card.change)}%</div><span class="label">${escapeHtml(card.title)}</span><span class="value">${escapeHtml(card.value)}</span></div>`;
      });
      return `<section class="cards">${cards.join('')}</section>`;
    };

    const renderInfo = (latest) => {
      if (!latest) {
        return '';
      }
      const link = latest.url
        ? `<p><span class="label">URL</span> <a href="${escapeHtml(latest.url)}" target="_blank" rel="noopener noreferrer">Open product page</a></p>`
        : '';
      return `<section class="info"><h2>Product</h2>`
        + `<p><span class="label">Name</span> ${escapeHtml(latest.name)}</p>`
        + `<p><span class="label">Platform</span> ${escapeHtml(latest.platform)}</p>`
        + `<p><span class="label">Last updated</span> ${escapeHtml(latest.last_updated)}</p>`
        + `${link}</section>`;
    };

    const render = (view) => {
      setStatus(view.error ? `Store error: ${view.error}` : '');
      if (view.loading) {
        bodyEl.innerHTML = '<div class="spinner" aria-label="Loading"></div>';
        return;
      }
      if (!view.selected || !view.series.length) {
        bodyEl.innerHTML = '<p class="hint">No snapshots to show yet.</p>';
        return;
      }

      const charts = CHARTS
        .map((chart) => `<div class="chart-card"><h2>${chart.title}</h2><svg id="chart-${chart.key}" viewBox="0 0 600 260" role="img" aria-label="${chart.title}"></svg></div>`)
        .join('');
      bodyEl.innerHTML = `${renderCards(view)}<section class="charts">${charts}</section>${renderInfo(view.latest)}`;
      CHARTS.forEach((chart) => {
        renderChart(document.getElementById(`chart-${chart.key}`), view.series, chart);
      });
    };

    let requestSeq = 0;

    selectEl.addEventListener('change', async (event) => {
      const name = event.target.value;
      const seq = ++requestSeq;
      bodyEl.innerHTML = '<div class="spinner" aria-label="Loading"></div>';
      try {
        const response = await fetch('/api/select', {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify({ name })
        });
        if (!response.ok) {
          throw new Error(await response.text());
        }
        const view = await response.json();
        if (seq === requestSeq) {
          render(view);
        }
      } catch (err) {
        if (seq === requestSeq) {
          setStatus(`Could not load product: ${err.message}`);
        }
      }
    });

    if (initialView) {
      render(initialView);
    }
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChartPoint, Metric};

    fn view() -> DashboardView {
        let point = |date: &str, price: f64| ChartPoint {
            date: date.to_string(),
            price,
            review_count: 10,
            rating_value: 4.2,
            rank: 3,
        };
        DashboardView {
            products: vec!["Fish <Oil>".to_string(), "Zinc".to_string()],
            selected: Some("Zinc".to_string()),
            loading: false,
            series: vec![point("03/01 09:00", 100.0), point("03/01 21:00", 110.0)],
            latest: Some(LatestSummary {
                name: "Zinc".to_string(),
                platform: "rakuten".to_string(),
                url: Some("https://example.com/zinc".to_string()),
                last_updated: "2025-03-01 21:00".to_string(),
                scraped_at: chrono::DateTime::from_timestamp(1_740_830_400, 0).unwrap(),
            }),
            stats: Some(vec![StatCard {
                metric: Metric::Price,
                title: "Price".to_string(),
                value: "¥110".to_string(),
                change: "10.0".to_string(),
                trend: Trend::Up,
            }]),
            error: None,
        }
    }

    #[test]
    fn index_renders_selector_cards_and_info() {
        let html = render_index(&view());

        assert!(html.contains("<option value=\"Zinc\" selected>Zinc</option>"));
        assert!(html.contains("Fish &lt;Oil&gt;"));
        assert!(html.contains("class=\"change up\""));
        assert!(html.contains("10.0%"));
        assert!(html.contains("Open product page"));
        assert!(html.contains("id=\"chart-rank\""));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn single_point_view_has_no_cards() {
        let mut view = view();
        view.series.truncate(1);
        view.stats = None;

        let html = render_index(&view);
        assert!(!html.contains("class=\"cards\""));
        assert!(html.contains("id=\"chart-price\""));
    }

    #[test]
    fn empty_view_shows_hint() {
        let html = render_index(&DashboardView {
            products: Vec::new(),
            selected: None,
            loading: false,
            series: Vec::new(),
            latest: None,
            stats: None,
            error: None,
        });
        assert!(html.contains("No snapshots to show yet."));
        assert!(!html.contains("Last updated</span>"));
    }

    #[test]
    fn embedded_json_cannot_close_script() {
        let mut view = view();
        view.products.push("</script><b>".to_string());
        let html = render_index(&view);
        assert!(!html.contains("</script><b>"));
        assert!(html.contains("\\u003c/script\\u003e\\u003cb\\u003e"));
    }

    #[test]
    fn placeholder_text_in_product_names_stays_escaped() {
        let mut view = view();
        view.products = vec![
            "{{VIEW_JSON}}".to_string(),
            "\"><img src=x onerror=alert(1)>".to_string(),
        ];
        view.selected = None;

        let html = render_index(&view);
        assert!(!html.contains("<img src=x"));
        assert!(html.contains("<option value=\"{{VIEW_JSON}}\">{{VIEW_JSON}}</option>"));
        assert!(html.contains("&quot;&gt;&lt;img src=x onerror=alert(1)&gt;"));
        assert_eq!(html.matches("const initialView = {").count(), 1);
    }

    #[test]
    fn unknown_braces_are_left_alone() {
        let filled = fill_template("a {{X}} {{Y}} b", &[("{{X}}", "{{Y}}".to_string())]);
        assert_eq!(filled, "a {{Y}} {{Y}} b");
    }

    #[test]
    fn long_names_are_truncated_in_options() {
        let name = "x".repeat(90);
        let label = option_label(&name);
        assert_eq!(label.chars().count(), 83);
        assert!(label.ends_with("..."));
        assert_eq!(option_label("short"), "short");
    }
}
