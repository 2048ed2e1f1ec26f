use chrono::{Datelike, Utc};

use crate::problems::feedback::Feedback;
use crate::problems::problem::{Difficulty, Problem};
use crate::state::session::{Screen, Session};
use crate::views::balance::render_equation_balance;
use crate::views::escape_html;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; background: #fcfdfe; margin: 0; padding: 0 1rem 5rem; color: #1f2937; }
header, main, footer { max-width: 56rem; margin: 0 auto; }
header { display: flex; align-items: center; gap: .75rem; padding: 2rem 0; border-bottom: 1px solid #f3f4f6; margin-bottom: 2rem; }
.logo { width: 3rem; height: 3rem; border-radius: 1rem; background: #4f46e5; color: #fff; font-weight: 900; font-size: 1.5rem; display: flex; align-items: center; justify-content: center; }
.card { background: #fff; border-radius: 2rem; box-shadow: 0 10px 30px rgba(0,0,0,.08); padding: 2.5rem; }
.levels { display: grid; grid-template-columns: repeat(3, 1fr); gap: 1.5rem; margin-top: 2rem; }
.levels button { width: 100%; padding: 2rem; border-radius: 1.5rem; border: 2px solid #e0e7ff; background: #eef2ff; text-align: left; cursor: pointer; }
.blackboard { background: #4338ca; color: #fff; border-radius: 1.5rem; padding: 2.5rem; text-align: center; font-size: 3rem; font-weight: 900; margin-bottom: 2rem; }
.balance { display: flex; flex-direction: column; align-items: center; padding: 1.5rem; border: 4px solid #dbeafe; border-radius: 1rem; margin-bottom: 2rem; }
.balance-frame { display: flex; align-items: flex-end; justify-content: center; width: 100%; position: relative; }
.balance-beam { position: absolute; top: 50%; left: 25%; right: 25%; height: .5rem; background: #9ca3af; border-radius: 999px; }
.pan { display: flex; flex-direction: column; align-items: center; width: 33%; }
.pan-label { padding: 1rem; width: 100%; min-height: 1.5rem; text-align: center; font-weight: 700; border-radius: .5rem .5rem 0 0; }
.pan-left .pan-label { background: #fef9c3; border: 2px solid #fde047; color: #2563eb; }
.pan-right .pan-label { background: #dcfce7; border: 2px solid #86efac; color: #15803d; }
.pan-string { width: .25rem; height: 3rem; background: #9ca3af; }
.balance-pivot { width: 2rem; height: 2rem; border-radius: 50%; background: #3b82f6; border: 4px solid #fff; }
.balance-base { width: 6rem; height: 1rem; background: #6b7280; border-radius: .5rem .5rem 0 0; }
.balance-caption { font-style: italic; color: #6b7280; font-size: .875rem; }
.answer-row { display: flex; gap: .75rem; }
.answer-row input { flex: 1; font-size: 1.5rem; padding: 1rem; border-radius: .75rem; border: 2px solid #e5e7eb; }
.primary { background: #4f46e5; color: #fff; border: 0; border-radius: .75rem; padding: 1rem 2.5rem; font-weight: 900; cursor: pointer; }
.primary:disabled { background: #d1d5db; }
.secondary { background: #f3f4f6; color: #4b5563; border: 0; border-radius: .75rem; padding: 1rem 2rem; font-weight: 700; cursor: pointer; }
.correct { border-top: 12px solid #22c55e; }
.incorrect { border-top: 12px solid #fb923c; }
.message { background: #f9fafb; padding: 1.5rem; border-radius: 1rem; font-style: italic; white-space: pre-wrap; }
.steps li { background: #eef2ff; margin: .5rem 0; padding: .75rem; border-radius: .75rem; }
.tip { background: #fefce8; border: 1px solid #fde68a; padding: 1.5rem; border-radius: 1.5rem; }
.visual img { width: 100%; aspect-ratio: 1 / 1; object-fit: cover; border-radius: 1.5rem; }
.actions { display: flex; gap: 1rem; margin-top: 3rem; }
.overlay { position: fixed; inset: 0; background: rgba(49,46,129,.1); display: flex; align-items: center; justify-content: center; }
.overlay div { background: #fff; padding: 3rem; border-radius: 3rem; text-align: center; font-weight: 900; }
.toast { position: fixed; bottom: 2rem; left: 50%; transform: translateX(-50%); background: #1f2937; color: #fff; padding: 1rem 2rem; border-radius: 999px; }
footer { margin-top: 6rem; padding-top: 2rem; border-top: 1px solid #f3f4f6; color: #9ca3af; font-size: .75rem; }
"#;

/// Render the full page for the current session.
pub fn render_page(session: &Session) -> String {
    let body = match (session.screen, &session.problem, &session.feedback) {
        (Screen::Solving, Some(problem), _) => render_solving(problem, session),
        (Screen::Feedback, Some(problem), Some(feedback)) => {
            render_feedback(problem, feedback, session.visual_url.as_deref())
        }
        _ => render_home(),
    };

    let refresh = if session.loading {
        r#"<meta http-equiv="refresh" content="2">"#
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
{refresh}
<title>Equation Tutor</title>
<style>{style}</style>
</head>
<body>
{header}
<main>
{body}
</main>
{overlay}{toast}{footer}
</body>
</html>"#,
        refresh = refresh,
        style = STYLE,
        header = render_header(),
        body = body,
        overlay = if session.loading { render_loading_overlay() } else { String::new() },
        toast = session.notice.as_deref().map(render_toast).unwrap_or_default(),
        footer = render_footer(),
    )
}

fn render_header() -> String {
    r#"<header>
  <form method="post" action="/home"><button class="logo" type="submit">x</button></form>
  <div><strong>Equation Tutor</strong><br><small>SMART MATH TEACHER</small></div>
</header>"#
        .to_string()
}

fn render_home() -> String {
    let levels: String = Difficulty::ALL
        .iter()
        .map(|level| {
            format!(
                r#"<form method="post" action="/problem">
    <input type="hidden" name="level" value="{value}">
    <button type="submit"><strong>{label}</strong><p>{subtitle}</p></button>
  </form>"#,
                value = level.as_str(),
                label = level.label(),
                subtitle = level.subtitle(),
            )
        })
        .collect();

    format!(
        r#"<section class="card" id="home">
  <h1>Linear Equations Classroom</h1>
  <p>"Math is really fun once you know the principle! Shall we solve them together, one at a time?"</p>
  <div class="levels">
  {levels}
  </div>
</section>"#,
        levels = levels
    )
}

fn render_solving(problem: &Problem, session: &Session) -> String {
    let disabled = if session.loading { " disabled" } else { "" };
    format!(
        r#"<section class="card" id="solving">
  <form method="post" action="/home"><button class="secondary" type="submit">&lsaquo; Back to the staff room</button></form>
  <p><small>PROBLEM ON THE BLACKBOARD</small></p>
  <div class="blackboard">{equation}</div>
  {balance}
  <form method="post" action="/answer">
    <label for="answer">Write your answer on the scratch pad!</label>
    <div class="answer-row">
      <span>x =</span>
      <input id="answer" name="answer" type="number" step="any" placeholder="?" value="{answer}" required autofocus>
      <button class="primary" type="submit"{disabled}>Submit</button>
    </div>
  </form>
</section>"#,
        equation = escape_html(&problem.equation),
        balance = render_equation_balance(&problem.equation),
        answer = escape_html(&session.answer),
        disabled = disabled,
    )
}

fn render_feedback(problem: &Problem, feedback: &Feedback, visual_url: Option<&str>) -> String {
    let (class, badge, headline) = if feedback.is_correct {
        ("correct", "Excellent!", "Perfect! Really well done!")
    } else {
        ("incorrect", "Keep Going!", "So close, you're almost there!")
    };

    let visual = visual_url
        .map(|url| {
            format!(
                r#"<div class="visual"><p><small>Teacher's picture explanation</small></p><img src="{}" alt="Visual Aid"></div>"#,
                escape_html(url)
            )
        })
        .unwrap_or_default();

    let steps: String = problem
        .steps
        .iter()
        .map(|step| format!("<li>{}</li>", escape_html(step)))
        .collect();

    format!(
        r#"<section class="card {class}" id="feedback">
  <span class="badge">{badge}</span>
  <h2>{headline}</h2>
  <div class="message">"{message}"</div>
  {visual}
  <h3>Correct solution steps</h3>
  <ol class="steps">{steps}</ol>
  <div class="tip"><h4>Today's math tip</h4><p>"{tip}"</p></div>
  <div class="actions">
    <form method="post" action="/restart"><button class="primary" type="submit">Try the next problem!</button></form>
    <form method="post" action="/home"><button class="secondary" type="submit">Home</button></form>
  </div>
</section>"#,
        class = class,
        badge = badge,
        headline = headline,
        message = escape_html(&feedback.message),
        visual = visual,
        steps = steps,
        tip = escape_html(&feedback.concept_tip),
    )
}

fn render_loading_overlay() -> String {
    r#"<div class="overlay" id="loading"><div><p>The teacher is tidying up the blackboard...</p><p><small>Just a moment, please!</small></p></div></div>"#
        .to_string()
}

fn render_toast(notice: &str) -> String {
    format!(r#"<div class="toast" role="status">{}</div>"#, escape_html(notice))
}

fn render_footer() -> String {
    format!(
        "<footer><p>&copy; {} Equation Tutor. Personalised math practice powered by a generative model.</p></footer>",
        Utc::now().year()
    )
}
