//! Direct anonymization: uniform generalization without search.

use tracing::{debug, instrument};

use crate::anonymity::{Anonymization, KmAnonymity, Strategy};
use crate::cut::Cut;

/// Tries the uniform cuts at levels `1..height`, lowest first.
///
/// At most `height - 1` candidates are verified, whatever the lattice size.
#[instrument(skip_all, fields(k = engine.k(), m = engine.m()))]
pub fn run<'a>(engine: &KmAnonymity<'a>) -> Anonymization<'a> {
    let hierarchy = engine.hierarchy();
    let mut examined = 0;
    for level in 1..hierarchy.height() {
        let cut = Cut::at_level(hierarchy, level);
        examined += 1;
        if engine.is_km_anonymous(&cut) {
            debug!(level, loss = cut.information_loss(), "uniform level is km-anonymous");
            return Anonymization::new(cut, Strategy::Direct, examined);
        }
    }
    engine.fallback(Strategy::Direct, examined)
}
