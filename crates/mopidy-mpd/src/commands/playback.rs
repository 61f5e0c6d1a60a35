//! Transport control and playback options.

use mopidy_core::PlaybackState;

use super::{CatalogEntry, CommandContext, not_implemented};
use crate::dispatch::{Arguments, Capability, CommandError, Payload};

/// Position or id meaning "resume or start the current entry".
const CURRENT: i64 = -1;

pub(super) const COMMANDS: &[CatalogEntry] = &[
    ("consume <state>", Capability::Playback, not_implemented),
    ("crossfade <seconds>", Capability::Playback, not_implemented),
    ("next", Capability::Playback, next),
    ("pause [<state>]", Capability::Playback, pause),
    ("play [<songpos>]", Capability::Playback, play),
    ("playid [<songid>]", Capability::Playback, playid),
    ("previous", Capability::Playback, previous),
    ("random <state>", Capability::Playback, not_implemented),
    ("repeat <state>", Capability::Playback, not_implemented),
    ("replay_gain_mode <mode>", Capability::Playback, not_implemented),
    ("seek <songpos> <time>", Capability::Playback, not_implemented),
    ("seekid <songid> <time>", Capability::Playback, not_implemented),
    ("setvol <volume>", Capability::Output, not_implemented),
    ("single <state>", Capability::Playback, not_implemented),
    ("stop", Capability::Playback, stop),
];

fn next(
    context: &mut CommandContext<'_>,
    _arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    context.backend().playback().next()?;
    Ok(Payload::new())
}

fn previous(
    context: &mut CommandContext<'_>,
    _arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    context.backend().playback().previous()?;
    Ok(Payload::new())
}

fn stop(
    context: &mut CommandContext<'_>,
    _arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    context.backend().playback().stop()?;
    Ok(Payload::new())
}

/// `pause 1` pauses, `pause 0` resumes, a bare `pause` toggles.
fn pause(
    context: &mut CommandContext<'_>,
    arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    let playback = context.backend().playback();
    let pause = match arguments.flag("state")? {
        Some(pause) => pause,
        None => playback.state()? == PlaybackState::Playing,
    };
    if pause {
        playback.pause()?;
    } else {
        playback.resume()?;
    }
    Ok(Payload::new())
}

fn play(
    context: &mut CommandContext<'_>,
    arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    let backend = context.backend();
    let entry = match arguments.optional_int("songpos")? {
        None | Some(CURRENT) => None,
        Some(position) => {
            let position = usize::try_from(position)
                .map_err(|_| CommandError::argument("Bad song index"))?;
            Some(backend.current_playlist().entry_at(position)?)
        }
    };
    backend.playback().play(entry)?;
    Ok(Payload::new())
}

fn playid(
    context: &mut CommandContext<'_>,
    arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    let backend = context.backend();
    let entry = match arguments.optional_int("songid")? {
        None | Some(CURRENT) => None,
        Some(id) => {
            let id = u32::try_from(id).map_err(|_| CommandError::argument("Bad song id"))?;
            Some(backend.current_playlist().entry_by_id(id)?)
        }
    };
    backend.playback().play(entry)?;
    Ok(Payload::new())
}
