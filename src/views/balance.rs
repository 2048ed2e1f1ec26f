use crate::views::escape_html;

pub const BALANCE_CAPTION: &str =
    "Both sides of an equation must always stay in balance, just like a scale!";

/// Split an equation on its first `=` into trimmed left and right sides.
/// Without an `=` the right side is empty.
pub fn split_equation(equation: &str) -> (String, String) {
    match equation.split_once('=') {
        Some((left, right)) => (left.trim().to_string(), right.trim().to_string()),
        None => (equation.trim().to_string(), String::new()),
    }
}

/// Render a two-pan balance with `left` and `right` as the pan labels.
pub fn render_balance_scale(left: &str, right: &str) -> String {
    format!(
        r#"<div class="balance">
  <div class="balance-frame">
    <div class="balance-beam"></div>
    <div class="pan pan-left"><div class="pan-label">{left}</div><div class="pan-string"></div></div>
    <div class="balance-pivot"></div>
    <div class="pan pan-right"><div class="pan-label">{right}</div><div class="pan-string"></div></div>
  </div>
  <div class="balance-base"></div>
  <p class="balance-caption">"{caption}"</p>
</div>"#,
        left = escape_html(left),
        right = escape_html(right),
        caption = escape_html(BALANCE_CAPTION),
    )
}

/// Balance for a whole equation string
pub fn render_equation_balance(equation: &str) -> String {
    let (left, right) = split_equation(equation);
    render_balance_scale(&left, &right)
}
