//! # Example: Cutscene
//!
//! Drives three instances from a fixed 60 fps loop:
//! - `intro`: camera pan, fire-and-forget music cue, then a dialogue line;
//! - `door`: its trigger fires whenever it is idle after the first second, so it
//!   reruns back to back; each completion asks the intro to execute again
//!   (a no-op while the intro is still running);
//! - a `Sparkle` created through the helper, destroyed by the host when it completes.
//!
//! Run with: `cargo run --example cutscene --features logging`

use std::time::Duration;

use stagehand::{
    main_thread, non_blocking, Command, Delay, Director, DirectorConfig, EventKind, LogWriter,
    ScaledDelay, Sequence, SequenceConfig, SequenceFn, Step, TaskFn, TaskRef, Wait,
};

const FRAME: Duration = Duration::from_micros(16_667);

#[derive(Default)]
struct Sparkle;

impl Sequence for Sparkle {
    fn tasks(&mut self) -> Vec<TaskRef> {
        vec![
            Box::new(ScaledDelay::secs(0.3)),
            main_thread(|| println!("[sparkle] *pop*")),
        ]
    }
}

fn intro_tasks() -> Vec<TaskRef> {
    let mut panned = 0u32;
    let mut said = false;
    vec![
        TaskFn::boxed("camera_pan", move |_cx| {
            panned += 10;
            if panned < 90 {
                Step::Next
            } else {
                println!("[intro] camera in place");
                Step::Done
            }
        }),
        non_blocking(TaskFn::new("music_cue", |cx| {
            println!("[intro] music starts at frame {}", cx.clock().frame());
            Step::Done
        })),
        TaskFn::boxed("dialogue", move |_cx| {
            if said {
                return Step::Done;
            }
            said = true;
            println!("[intro] \"Welcome, traveler.\"");
            Step::Wait(Wait::SecondsRealtime(Duration::from_millis(500)))
        }),
    ]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let cfg = DirectorConfig::from_json(r#"{ "time_scale": 1.5 }"#)?;
    let mut director = Director::new(cfg)?;
    director.subscribe(LogWriter);

    let intro = director.spawn(
        SequenceFn::new("intro", intro_tasks),
        SequenceConfig::default().with_execute_on_start(true),
    );

    let door = director.spawn(
        SequenceFn::new("door", || {
            vec![
                Box::new(Delay::secs(0.2)) as TaskRef,
                main_thread(|| println!("[door] creak")),
            ]
        })
        .with_trigger(|clock| clock.unscaled_time() >= Duration::from_secs(1)),
        SequenceConfig::default(),
    );

    // Every door completion re-executes the intro; ignored while the intro is active.
    director.on(door, EventKind::Completed, move |_ev, ctl| {
        ctl.send(intro, Command::Execute);
    });

    let sparkle = director.create::<Sparkle>(true);
    director.execute(sparkle);

    for _ in 0..180 {
        director.tick(FRAME);

        for id in director.drain_destroy_requests() {
            println!("[host] destroying object of {id}");
            director.finalize(id);
        }
    }

    director.halt_all();
    println!(
        "[host] {} instances left after {} frames",
        director.len(),
        director.clock().frame()
    );
    Ok(())
}
