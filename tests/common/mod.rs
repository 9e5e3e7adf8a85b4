/// The rooms-and-objects story: two people wander between rooms, pick up
/// drinks in the kitchen, and settle down to work in the study.
use narrative_world::{Action, BodyResult, Narrative, NarrativeBuilder, NounId, StoryEvent, World};

pub const NOUNS: &str = "story_data/rooms_and_objects/nouns.ron";
pub const DISCOURSE: &str = "story_data/rooms_and_objects/discourse.ron";

fn located(w: &World, id: NounId) -> Option<NounId> {
    w.related_by_tag("currently in", id, "room")
}

fn in_room(w: &World, id: NounId, room: &str) -> bool {
    w.noun(room)
        .map(|room| w.is_related("currently in", id, room))
        .unwrap_or(false)
}

pub fn actions() -> Vec<Action> {
    vec![
        Action::binary(
            "#person",
            "#drink",
            |w, a, b| {
                let here = located(w, a);
                here.is_some() && here == located(w, b) && w.property_is(a, "has_drink", false)
            },
            |w, a, b| {
                let events = vec![StoryEvent::binary("take", a, b)];
                w.unrelate_by_tag("currently in", b, "room");
                w.set_property(a, "has_drink", true)?;
                Ok(events)
            },
        )
        .named("take"),
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
        Action::binary(
            "#person",
            "#person",
            |w, a, b| located(w, a) == located(w, b),
            |_, a, b| Ok(vec![StoryEvent::binary("chatsWith", a, b)]),
        )
        .named("talk"),
        Action::unary(
            "#person",
            |w, a| in_room(w, a, "study") && w.property_is(a, "has_drink", true),
            |_, a| Ok(vec![StoryEvent::unary("isWorking", a)]),
        )
        .named("work"),
        Action::unary(
            "#person",
            |w, a| in_room(w, a, "living room"),
            |_, a| Ok(vec![StoryEvent::unary("playGames", a)]),
        )
        .named("play video games"),
    ]
}

pub fn initialize(w: &mut World) -> BodyResult {
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
}

pub fn rooms_builder(seed: u64) -> NarrativeBuilder {
    Narrative::builder()
        .nouns_ron_file(NOUNS)
        .discourse_ron_file(DISCOURSE)
        .with_actions(actions())
        .initialize(initialize)
        .seed(seed)
}
