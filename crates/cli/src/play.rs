//! Interactive play-through in the terminal.

use dialoguer::{Confirm, Input, Select};
use eco_engine::catalog::ModuleDef;
use eco_engine::quiz::StageStatus;
use eco_engine::session::MAX_TOTAL_SCORE;
use eco_engine::{Answer, ModuleId, Session, StageKind, StageSpec};

pub struct PlayOptions {
    pub module: Option<ModuleId>,
    pub show_lesson: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum MenuChoice {
    Module(ModuleId),
    Reset,
    Quit,
}

/// Run the menu loop until the learner quits.
pub fn run(session: &mut Session, opts: PlayOptions) -> Result<(), dialoguer::Error> {
    let mut next = opts.module;
    loop {
        let id = match next.take() {
            Some(id) => id,
            None => match pick_module(session)? {
                MenuChoice::Module(id) => id,
                MenuChoice::Reset => {
                    session.reset_all();
                    println!("Progress reset.");
                    continue;
                }
                MenuChoice::Quit => break,
            },
        };
        play_module(session, id, opts.show_lesson)?;
        print_progress(session);
    }
    Ok(())
}

fn pick_module(session: &Session) -> Result<MenuChoice, dialoguer::Error> {
    let mut labels: Vec<String> = ModuleId::ALL
        .iter()
        .map(|&id| {
            let state = session.get_state(id);
            let status = if state.completed { "✅" } else { "▶️" };
            format!("{} {} {} ({}/10)", id.def().icon, id.name(), status, state.score)
        })
        .collect();
    labels.push("Reset progress".to_string());
    labels.push("Quit".to_string());

    let idx = Select::new()
        .with_prompt("Select a system to explore")
        .items(&labels[..])
        .default(0)
        .interact()?;

    Ok(menu_choice(idx))
}

/// Menu rows are the modules in order, then "Reset progress", then "Quit".
fn menu_choice(idx: usize) -> MenuChoice {
    match ModuleId::ALL.get(idx) {
        Some(&id) => MenuChoice::Module(id),
        None if idx == ModuleId::ALL.len() => MenuChoice::Reset,
        None => MenuChoice::Quit,
    }
}

fn play_module(session: &mut Session, id: ModuleId, show_lesson: bool) -> Result<(), dialoguer::Error> {
    let def = id.def();
    println!("\n{} {}", def.icon, def.name);
    if show_lesson {
        print_lesson(def);
    }

    while let Some(spec) = session.current_stage(id) {
        let state = session.get_state(id);
        print_markers(session, id);
        println!(
            "\nStage {}: {} ({} pt{})",
            state.stage,
            spec.title,
            spec.points,
            if spec.points == 1 { "" } else { "s" }
        );
        if let Some(hint) = state.hint {
            println!("Hint: {}", hint);
        }

        let answer = prompt_answer(spec)?;
        let outcome = session.submit_answer(id, state.stage, &answer);
        if outcome.correct {
            println!("Correct! +{}", outcome.awarded_points);
        } else {
            println!("{}", outcome.feedback.unwrap_or("Not quite."));
            let retry = Confirm::new()
                .with_prompt("Try again?")
                .default(true)
                .interact()?;
            if !retry {
                return Ok(());
            }
        }
        if let Some(badge) = outcome.achievement {
            println!("🏅 Achievement unlocked: {}", badge);
        }
    }

    let state = session.get_state(id);
    println!("\n🎉 Completed! Score: {}/{}", state.score, def.max_score());
    Ok(())
}

fn prompt_answer(spec: &StageSpec) -> Result<Answer, dialoguer::Error> {
    match &spec.kind {
        StageKind::Ordering { components, .. } => {
            println!("Arrange the components in order:");
            let mut order = Vec::with_capacity(components.len());
            for slot in 1..=components.len() {
                let idx = Select::new()
                    .with_prompt(slot.to_string())
                    .items(&components[..])
                    .default(0)
                    .interact()?;
                order.push(components[idx].to_string());
            }
            Ok(Answer::Order(order))
        }
        StageKind::Choice {
            prompt, options, ..
        } => {
            let idx = Select::new()
                .with_prompt(*prompt)
                .items(&options[..])
                .default(0)
                .interact()?;
            Ok(Answer::Choice(options[idx].to_string()))
        }
        StageKind::Numeric {
            prompt,
            unit,
            range,
            ..
        } => {
            let (min, max) = *range;
            println!("{}", prompt);
            let value = Input::<f64>::new()
                .with_prompt(*unit)
                .default(min)
                .validate_with(move |v: &f64| -> Result<(), String> {
                    if (min..=max).contains(v) {
                        Ok(())
                    } else {
                        Err(format!("enter a value between {} and {}", min, max))
                    }
                })
                .interact_text()?;
            Ok(Answer::Number(value))
        }
    }
}

fn print_markers(session: &Session, id: ModuleId) {
    let Some(module) = session.module(id) else {
        return;
    };
    for p in module.stage_progress() {
        if p.status == StageStatus::Done {
            println!("✅ Stage {} Complete", p.number);
        }
    }
}

pub fn print_lesson(def: &ModuleDef) {
    println!("\nHow it works");
    for (i, step) in def.how_it_works.iter().enumerate() {
        println!("  {}. {}", i + 1, step);
    }
    println!("\nSystem diagram");
    println!("  {}", def.flow.join(" → "));
    for (from, to) in def.branches {
        println!("  {} → {}", from, to);
    }
    println!("\nKey facts");
    for fact in def.key_facts {
        println!("  - {}", fact);
    }
}

pub fn print_progress(session: &Session) {
    let agg = session.aggregate();
    println!("\n📈 Progress");
    println!("  Total Score: {} / {}", agg.total_score, MAX_TOTAL_SCORE);
    println!(
        "  Systems Mastered: {} / {} ({:.0}%)",
        agg.completed_count,
        ModuleId::ALL.len(),
        agg.completion_fraction * 100.0
    );
    if !agg.achievements.is_empty() {
        println!("  Achievements: {}", agg.achievements.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_rows_map_to_choices() {
        assert_eq!(menu_choice(0), MenuChoice::Module(ModuleId::Solar));
        assert_eq!(menu_choice(1), MenuChoice::Module(ModuleId::Wind));
        assert_eq!(menu_choice(2), MenuChoice::Module(ModuleId::Hydro));
        assert_eq!(menu_choice(3), MenuChoice::Module(ModuleId::Biomass));
        assert_eq!(menu_choice(4), MenuChoice::Reset);
        assert_eq!(menu_choice(5), MenuChoice::Quit);
    }
}
