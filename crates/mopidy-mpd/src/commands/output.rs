//! Audio outputs.

use super::{CatalogEntry, CommandContext, not_implemented};
use crate::dispatch::{Arguments, Capability, CommandError, Payload};

pub(super) const COMMANDS: &[CatalogEntry] = &[
    ("disableoutput <outputid>", Capability::Output, not_implemented),
    ("enableoutput <outputid>", Capability::Output, not_implemented),
    ("outputs", Capability::Output, outputs),
];

fn outputs(
    context: &mut CommandContext<'_>,
    _arguments: &Arguments<'_>,
) -> Result<Payload, CommandError> {
    let mut payload = Payload::new();
    for output in context.backend().mixer().outputs()? {
        payload.push("outputid", output.id);
        payload.push("outputname", output.name);
        payload.push("outputenabled", u8::from(output.enabled));
    }
    Ok(payload)
}
