use clipsight_core::{AppViewModel, Phase};

const BAR_WIDTH: usize = 40;

/// Prints the current view to stdout. Called only when the state is dirty.
pub fn render(view: &AppViewModel) {
    match view.phase {
        Phase::Entry | Phase::Connecting | Phase::Observing => render_progress(view),
        Phase::Completed => render_results(view),
        Phase::Aborted => {
            if let Some(banner) = &view.banner {
                println!("Aborted: {banner}");
            } else {
                println!("Aborted.");
            }
        }
    }
}

fn render_progress(view: &AppViewModel) {
    let filled = BAR_WIDTH * usize::from(view.percent) / 100;
    let bar: String = (0..BAR_WIDTH)
        .map(|i| if i < filled { '#' } else { '-' })
        .collect();
    println!("[{bar}] {:>3}%  {}", view.percent, view.status_line);
    if let Some(banner) = &view.banner {
        println!("  ! {banner}");
    }
}

fn render_results(view: &AppViewModel) {
    println!("{}", view.status_line);
    if let Some(job) = &view.job {
        let mut line = format!("Job {} ({})", job.id, job.original_file_name);
        if let Some(m) = &job.match_label {
            line.push_str(&format!(" - {m}"));
        }
        if let Some(c) = &job.competition {
            line.push_str(&format!(" [{c}]"));
        }
        println!("{line}");
    }
    println!();
    for row in &view.assets {
        let mark = if row.selected { 'x' } else { ' ' };
        println!("  [{mark}] {:<28} {:<32} {}", row.friendly_name, row.filename, row.url);
    }
    println!();
    println!(
        "{} of {} selected{}",
        view.selected_count,
        view.assets.len(),
        if view.all_selected { " (all)" } else { "" }
    );
    if let Some(banner) = &view.banner {
        println!("  ! {banner}");
    }
}
