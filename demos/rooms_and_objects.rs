/// Rooms and Objects — two people, three rooms, two drinks.
///
/// Max and Rory wander between the living room, the kitchen, and the
/// study. Each picks up a drink when they find one, and once both are
/// settled in the study with a drink the story converges.
///
/// Run with: cargo run --example rooms_and_objects [seed]
/// Set RUST_LOG=narrative_world=debug to watch the scheduler.

use narrative_world::{Action, Narrative, NounId, StoryEvent, World};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn located(w: &World, id: NounId) -> Option<NounId> {
    w.related_by_tag("currently in", id, "room")
}

fn in_room(w: &World, id: NounId, room: &str) -> bool {
    w.noun(room)
        .map(|room| w.is_related("currently in", id, room))
        .unwrap_or(false)
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(2026);

    let mut narrative = Narrative::builder()
        .seed(seed)
        .nouns_ron_file("story_data/rooms_and_objects/nouns.ron")
        .discourse_ron_file("story_data/rooms_and_objects/discourse.ron")
        .initialize(|w| {
            let kitchen = w.noun("kitchen")?;
            let living = w.noun("living room")?;
            let study = w.noun("study")?;
            w.reciprocal("connects to", kitchen, living)?;
            w.reciprocal("connects to", kitchen, study)?;

            let mut events = Vec::new();
            for (who, room) in [
                ("Max", living),
                ("Rory", study),
                ("coffee", kitchen),
                ("tea", kitchen),
            ] {
                let who = w.noun(who)?;
                w.relate("currently in", who, room)?;
                events.push(StoryEvent::binary("in", who, room));
            }
            Ok(events)
        })
        // --- take: pick up a drink found in the same room ---
        .action(
            Action::binary(
                "#person",
                "#drink",
                |w, a, b| {
                    let here = located(w, a);
                    here.is_some()
                        && here == located(w, b)
                        && w.property_is(a, "has_drink", false)
                },
                |w, a, b| {
                    w.unrelate_by_tag("currently in", b, "room");
                    w.set_property(a, "has_drink", true)?;
                    Ok(vec![StoryEvent::binary("take", a, b)])
                },
            )
            .named("take"),
        )
        // --- move: wander, unless settled in the study with a drink ---
        .action(
            Action::unary(
                "#person",
                |w, a| !(in_room(w, a, "study") && w.property_is(a, "has_drink", true)),
                |w, a| {
                    let Some(current) = located(w, a) else {
                        return Ok(vec![]);
                    };
                    let dests = w.all_related_by_tag("connects to", current, "room");
                    let dest = *w.choice(&dests)?;
                    w.unrelate("currently in", a, current)?;
                    w.relate("currently in", a, dest)?;
                    Ok(vec![StoryEvent::binary("moveTo", a, dest)])
                },
            )
            .named("move"),
        )
        .action(
            Action::binary(
                "#person",
                "#person",
                |w, a, b| located(w, a) == located(w, b),
                |_, a, b| Ok(vec![StoryEvent::binary("chatsWith", a, b)]),
            )
            .named("talk"),
        )
        .action(
            Action::unary(
                "#person",
                |w, a| in_room(w, a, "study") && w.property_is(a, "has_drink", true),
                |_, a| Ok(vec![StoryEvent::unary("isWorking", a)]),
            )
            .named("work"),
        )
        .action(
            Action::unary(
                "#person",
                |w, a| in_room(w, a, "living room"),
                |_, a| Ok(vec![StoryEvent::unary("playGames", a)]),
            )
            .named("play video games"),
        )
        .build()
        .expect("Failed to build narrative");

    println!("========================================");
    println!("   ROOMS AND OBJECTS (seed {})", seed);
    println!("========================================");
    println!();

    for _ in 0..100 {
        let lines = narrative
            .step_and_render()
            .expect("Failed to step narrative");
        if lines.is_empty() {
            break;
        }
        for line in lines {
            println!("{}", line);
        }
    }
}
