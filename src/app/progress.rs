use std::io::{IsTerminal, Write};

use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use tokio::sync::mpsc;

use crate::http::BatchProgress;

/// Width of the progress bar in cells.
const BAR_SIZE: usize = 30;

/// Renders one progress line per gathered batch on stderr. When disabled (or
/// stderr is not a terminal) the channel is still drained so the driver never
/// observes a closed receiver.
pub(crate) fn setup_progress_indicator(
    mut progress_rx: mpsc::UnboundedReceiver<BatchProgress>,
    enabled: bool,
    no_color: bool,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let render = enabled && std::io::stderr().is_terminal();
        let style = ProgressStyle::new(BAR_SIZE);
        let mut rendered_any = false;

        while let Some(progress) = progress_rx.recv().await {
            if !render {
                continue;
            }
            let line = build_progress_line(&style, &progress, no_color);
            if render_progress_line(&line, no_color).is_err() {
                break;
            }
            rendered_any = true;
        }

        if rendered_any && finish_progress_line().is_err() {
            tracing::debug!("Failed to finish progress line.");
        }
    })
}

fn render_progress_line(line: &[ProgressSegment], no_color: bool) -> Result<(), std::io::Error> {
    let mut out = std::io::stderr();
    queue!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    for segment in line {
        if no_color {
            queue!(out, Print(&segment.text))?;
        } else if let Some(color) = segment.color {
            queue!(
                out,
                SetForegroundColor(color),
                Print(&segment.text),
                ResetColor
            )?;
        } else {
            queue!(out, Print(&segment.text))?;
        }
    }
    out.flush()?;
    Ok(())
}

fn finish_progress_line() -> Result<(), std::io::Error> {
    let mut out = std::io::stderr();
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

fn build_progress_line(
    style: &ProgressStyle,
    progress: &BatchProgress,
    no_color: bool,
) -> Vec<ProgressSegment> {
    let size = style.size.max(1);
    let total = progress.total.max(1);
    let completed = progress.completed.min(total);

    let completed_u128 = u128::from(completed);
    let total_u128 = u128::from(total);
    let size_u128 = u128::from(u64::try_from(size).unwrap_or(u64::MAX));

    let scaled = completed_u128
        .saturating_mul(size_u128)
        .checked_div(total_u128)
        .unwrap_or(0);
    let complete_size = usize::try_from(scaled).unwrap_or(size).min(size);
    let incomplete_size = size.saturating_sub(complete_size);

    let percent_text = format!(" {:.1}%", progress.percent);
    let count_text = format!(" ({}/{})", progress.completed, progress.total);
    let errors_text = format!(" errors: {}", progress.errors);

    let progress_bar = format!(
        "{}{}{}{}",
        style.begin,
        style.fill.repeat(complete_size),
        style.empty.repeat(incomplete_size),
        style.end
    );

    if no_color {
        return vec![
            ProgressSegment::plain(progress_bar),
            ProgressSegment::plain(percent_text),
            ProgressSegment::plain(count_text),
            ProgressSegment::plain(errors_text),
        ];
    }

    let errors_color = if progress.errors > 0 {
        Color::Red
    } else {
        Color::Green
    };
    vec![
        ProgressSegment::plain(progress_bar),
        ProgressSegment::colored(percent_text, Color::Cyan),
        ProgressSegment::plain(count_text),
        ProgressSegment::colored(errors_text, errors_color),
    ]
}

struct ProgressStyle {
    size: usize,
    begin: &'static str,
    end: &'static str,
    fill: &'static str,
    empty: &'static str,
}

impl ProgressStyle {
    const fn new(size: usize) -> Self {
        Self {
            size,
            begin: "[",
            end: "]",
            fill: "#",
            empty: "-",
        }
    }
}

struct ProgressSegment {
    text: String,
    color: Option<Color>,
}

impl ProgressSegment {
    const fn plain(text: String) -> Self {
        Self { text, color: None }
    }

    const fn colored(text: String, color: Color) -> Self {
        Self {
            text,
            color: Some(color),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(segments: &[ProgressSegment]) -> String {
        segments.iter().map(|segment| segment.text.as_str()).collect()
    }

    #[test]
    fn progress_line_shows_partial_batch() -> Result<(), String> {
        let style = ProgressStyle::new(10);
        let progress = BatchProgress::new(42, 100, 3);
        let text = line_text(&build_progress_line(&style, &progress, true));
        let expected = "[####------] 42.0% (42/100) errors: 3";
        if text != expected {
            return Err(format!("Expected '{}', got '{}'", expected, text));
        }
        Ok(())
    }

    #[test]
    fn progress_line_full_and_fractional() -> Result<(), String> {
        let style = ProgressStyle::new(10);
        let done = line_text(&build_progress_line(
            &style,
            &BatchProgress::new(7, 7, 0),
            true,
        ));
        if done != "[##########] 100.0% (7/7) errors: 0" {
            return Err(format!("Unexpected full line: {}", done));
        }
        let third = line_text(&build_progress_line(
            &style,
            &BatchProgress::new(1, 3, 0),
            true,
        ));
        if third != "[###-------] 33.3% (1/3) errors: 0" {
            return Err(format!("Unexpected fractional line: {}", third));
        }
        Ok(())
    }

    #[test]
    fn progress_line_shows_reported_percentage() -> Result<(), String> {
        let style = ProgressStyle::new(10);
        let progress = BatchProgress::new(2, 3, 1);
        let text = line_text(&build_progress_line(&style, &progress, true));
        if !text.contains(" 66.7% (2/3)") {
            return Err(format!("Expected the driver's percentage, got '{}'", text));
        }
        Ok(())
    }

    #[test]
    fn progress_line_colors_errors() -> Result<(), String> {
        let style = ProgressStyle::new(10);
        let segments = build_progress_line(&style, &BatchProgress::new(5, 10, 2), false);
        let errors_color = segments.last().and_then(|segment| segment.color);
        if errors_color != Some(Color::Red) {
            return Err(format!("Expected red errors segment, got {:?}", errors_color));
        }
        Ok(())
    }
}
