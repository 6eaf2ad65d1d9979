//! Shared fixtures for the end-to-end tests under `tests/`.

use ludics_design::{ActDraft, Design, DesignBuilder};
use ludics_locus::Locus;

/// Parse a locus, panicking on malformed fixtures.
pub fn l(s: &str) -> Locus {
    Locus::parse(s).unwrap_or_else(|e| panic!("bad fixture locus {:?}: {}", s, e))
}

/// Build a design rooted at `"0"` from drafts.
pub fn design(dialogue: &str, participant: &str, drafts: Vec<ActDraft>) -> Design {
    let mut builder = DesignBuilder::new(dialogue.into(), participant.into(), Locus::root());
    for draft in drafts {
        if let Err(e) = builder.push(draft) {
            panic!("bad fixture design for {}: {}", participant, e);
        }
    }
    builder.build()
}

/// Proponent asserts at `0` opening `0.0`; Opponent challenges at `0`
/// opening `opponent_child`; both close at `0.0`.
pub fn assert_and_challenge(opponent_child: u32) -> (Design, Design) {
    let pos = design(
        "dlg",
        "Proponent",
        vec![
            ActDraft::positive(l("0"), [0]).with_expression("claim"),
            ActDraft::daimon(l("0.0")),
        ],
    );
    let neg = design(
        "dlg",
        "Opponent",
        vec![
            ActDraft::negative(l("0"), [opponent_child]).with_expression("WHY"),
            ActDraft::daimon(l(&format!("0.{}", opponent_child))),
        ],
    );
    (pos, neg)
}

/// A chain that needs three pairs to reach a daimon at `0.1.1`.
pub fn three_pair_chain() -> (Design, Design) {
    let pos = design(
        "dlg",
        "Proponent",
        vec![
            ActDraft::positive(l("0"), [1]),
            ActDraft::positive(l("0.1"), [1]),
            ActDraft::daimon(l("0.1.1")),
        ],
    );
    let neg = design(
        "dlg",
        "Opponent",
        vec![
            ActDraft::negative(l("0"), [1]),
            ActDraft::negative(l("0.1"), [1]),
            ActDraft::negative(l("0.1.1"), []),
        ],
    );
    (pos, neg)
}

/// A move log in the external record format: assert, challenge, answer
/// with one sub-premise, challenge that premise, then both sides close it.
pub const CONCEDED_LOG: &str = r#"[
    {"id":"m1","actorId":"Proponent","targetType":"claim","targetId":"c1","createdAt":1,"kind":"ASSERT","expression":"The bridge is safe"},
    {"id":"m2","actorId":"Opponent","targetType":"claim","targetId":"c1","createdAt":2,"kind":"WHY","basis":{"criticalQuestion":"expert-reliable"}},
    {"id":"m3","actorId":"Proponent","targetType":"claim","targetId":"c1","createdAt":3,"kind":"GROUNDS","expression":"Inspected last month","premises":[1]},
    {"id":"m4","actorId":"Opponent","createdAt":4,"kind":"WHY","locus":"0.1","child":1},
    {"id":"m5","actorId":"Proponent","createdAt":5,"kind":"CLOSE","locus":"0.1.1"},
    {"id":"m6","actorId":"Opponent","createdAt":6,"kind":"CLOSE","locus":"0.1.1"}
]"#;
