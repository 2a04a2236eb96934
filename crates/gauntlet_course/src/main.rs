//! Headless course runner
//!
//! Builds a course (the first level, or a layout file), lets the player
//! auto-run through it at a fixed step and prints how far it got.
//!
//! Run with: cargo run -p gauntlet_course -- [layout.json]
//!       or: GAUNTLET_DASH_EVERY=3 cargo run --bin gauntlet

mod sim_config;

use gauntlet_core::body::{Body, Pawn};
use gauntlet_course::{Course, CourseLayout};
use sim_config::SimConfig;
use std::error::Error;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = SimConfig::load()?;
    config.print_summary();

    let layout = match &config.layout {
        Some(path) => CourseLayout::load(path)?,
        None => CourseLayout::level_one(),
    };

    if config.print_layout {
        println!("{}", layout.to_json()?);
        return Ok(());
    }

    let mut course = layout.build()?;
    let next_level = simulate(&mut course, &config)?;
    print_report(&course, next_level.as_deref());
    Ok(())
}

/// Step until the goal asks for a level or time runs out
fn simulate(course: &mut Course, config: &SimConfig) -> Result<Option<String>, Box<dyn Error>> {
    let player = course.player().map(|character| character.id());
    let frames = (config.seconds / config.dt).ceil() as u64;

    for frame in 0..frames {
        if let Some(player) = player {
            if SimConfig::is_due(config.dash_every, frame, config.dt) && course.request_dash(player)? {
                log::debug!("Dash at {:.2}s", course.elapsed());
            }
            if SimConfig::is_due(config.slide_every, frame, config.dt) && course.request_slide(player)? {
                log::debug!("Slide at {:.2}s", course.elapsed());
            }
        }

        course.step(config.dt);

        if let Some(level) = course.take_level_request() {
            log::info!("Goal reached after {:.2}s, next level '{}'", course.elapsed(), level);
            return Ok(Some(level));
        }
    }

    log::info!("Stopped after {:.2}s without reaching the goal", course.elapsed());
    Ok(None)
}

fn print_report(course: &Course, next_level: Option<&str>) {
    println!();
    println!("Course:      {}", course.name());
    println!("Time:        {:.2}s ({} frames)", course.elapsed(), course.frame());
    if let Some(player) = course.player() {
        let position = player.position();
        println!("Position:    ({:.0}, {:.0}, {:.0})", position.x, position.y, position.z);
        println!("Deaths:      {}", player.locomotion().deaths());
        println!("Dead:        {}", player.is_dead());
    }
    println!("Next level:  {}", next_level.unwrap_or("-"));
}
