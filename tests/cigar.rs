use refmod_rs::RefmodError;
use refmod_rs::cigar::{
    CigarOp, EditOp, edit_steps, expand_edit_script, parse_edit_script, runs_to_string,
};

fn assert_malformed(script: &str) {
    match expand_edit_script(script) {
        Err(RefmodError::MalformedEditScript { script: s, .. }) => assert_eq!(s, script),
        other => panic!("expected MalformedEditScript for {script:?}, got {other:?}"),
    }
}

#[test]
fn expands_runs_in_order() {
    let ops = expand_edit_script("3M2I").unwrap();
    assert_eq!(
        ops,
        vec![EditOp::Match, EditOp::Match, EditOp::Match, EditOp::Insert, EditOp::Insert]
    );
}

/// `5M1I3M` -> nine single steps with the insertion at index 5.
#[test]
fn expands_match_insert_match() {
    let ops = expand_edit_script("5M1I3M").unwrap();
    let mut expected = vec![EditOp::Match; 5];
    expected.push(EditOp::Insert);
    expected.extend(vec![EditOp::Match; 3]);
    assert_eq!(ops, expected);
}

#[test]
fn multi_digit_lengths() {
    let ops = expand_edit_script("12M10D").unwrap();
    assert_eq!(ops.len(), 22);
    assert_eq!(ops.iter().filter(|op| **op == EditOp::Delete).count(), 10);
}

/// Ops without reconciliation semantics are kept as `Other`.
#[test]
fn non_mid_ops_become_other() {
    let ops = expand_edit_script("1S1M1N1H1P1=1X").unwrap();
    assert_eq!(
        ops,
        vec![
            EditOp::Other(CigarOp::SoftClip),
            EditOp::Match,
            EditOp::Other(CigarOp::RefSkip),
            EditOp::Other(CigarOp::HardClip),
            EditOp::Other(CigarOp::Pad),
            EditOp::Other(CigarOp::Equal),
            EditOp::Other(CigarOp::Diff),
        ]
    );
}

#[test]
fn zero_length_runs_expand_to_nothing() {
    assert_eq!(expand_edit_script("0M2D").unwrap(), vec![EditOp::Delete, EditOp::Delete]);
}

#[test]
fn malformed_scripts_are_errors() {
    assert_malformed("");
    assert_malformed("M");
    assert_malformed("3M2");
    assert_malformed("3Z");
    assert_malformed("3M 2I");
    assert_malformed("*");
    assert_malformed("99999999999M");
}

#[test]
fn parse_then_render_normalizes() {
    let runs = parse_edit_script("003M2I").unwrap();
    assert_eq!(runs, vec![(3, CigarOp::Match), (2, CigarOp::Ins)]);
    assert_eq!(runs_to_string(&runs), "3M2I");
    assert_eq!(runs_to_string(&[]), "*");
}

#[test]
fn op_codes_round_trip_through_alphabet() {
    for code in ['M', 'I', 'D', 'N', 'S', 'H', 'P', '=', 'X'] {
        let op = CigarOp::from_code(code).unwrap();
        assert_eq!(op.code(), code);
    }
    assert_eq!(CigarOp::from_code('B'), None);
}

#[test]
fn edit_steps_are_lazy() {
    let runs = parse_edit_script("4000000000M1I").unwrap();
    let first: Vec<EditOp> = edit_steps(&runs).take(3).collect();
    assert_eq!(first, vec![EditOp::Match; 3]);
}
