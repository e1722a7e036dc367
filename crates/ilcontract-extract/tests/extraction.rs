//! Integration tests for contract extraction over whole method bodies.

use ilcontract_core::{
    count_stack_markers, BinOp, CalleeRef, ClauseKind, ConstValue, ContractSet, Fingerprint,
    MethodBody, MethodSignature, Node, NodeRef, Parameter, VarRef, FINGERPRINT_LEN,
};
use ilcontract_extract::{
    ContractMethod, ExtractError, Extraction, ExtractionDiagnostic, Extractor, ExtractorConfig,
    LegacyPositionRule, CONTRACT_TYPE,
};
use proptest::prelude::*;

fn method(name: &str, stmts: Vec<NodeRef>) -> MethodBody {
    let params = vec![
        Parameter {
            name: "amount".into(),
            type_name: "int".into(),
        },
        Parameter {
            name: "memo".into(),
            type_name: "string".into(),
        },
    ];
    MethodBody::new(
        "Bank.Account",
        MethodSignature::new(name, params, "int"),
        Fingerprint([7; FINGERPRINT_LEN]),
        Node::block(stmts),
    )
    .expect("block root")
}

fn contract(name: &str, args: Vec<NodeRef>) -> NodeRef {
    Node::call(CalleeRef::new(CONTRACT_TYPE, name), args)
}

fn amount_positive() -> NodeRef {
    Node::binary(BinOp::Gt, Node::arg(0, "amount"), Node::literal(ConstValue::I32(0)))
}

fn memo_not_null() -> NodeRef {
    Node::binary(BinOp::Ne, Node::arg(1, "memo"), Node::literal(ConstValue::Null))
}

fn throw_argument() -> NodeRef {
    Node::throw(Some(Node::new_object(
        CalleeRef::new("System.ArgumentOutOfRangeException", ".ctor"),
        vec![Node::literal(ConstValue::String("amount".into()))],
    )))
}

fn post(amount: NodeRef) -> NodeRef {
    Node::call(CalleeRef::new("Bank.Ledger", "Post"), vec![amount])
}

fn kinds(set: &ContractSet) -> Vec<ClauseKind> {
    set.iter().map(|c| c.kind).collect()
}

#[test]
fn mixed_contract_styles_in_one_method() {
    let result = Node::var(VarRef::Local { index: 0 });
    let stmts = vec![
        Node::conditional(Node::not(amount_positive()), throw_argument(), None),
        contract(
            "Requires",
            vec![
                memo_not_null(),
                Node::literal(ConstValue::String("memo required".into())),
            ],
        ),
        contract("EndContractBlock", vec![]),
        post(Node::arg(0, "amount")),
        contract(
            "Ensures",
            vec![Node::binary(BinOp::Ge, result.clone(), Node::literal(ConstValue::I32(0)))],
        ),
        Node::ret(Some(result)),
    ];

    let extraction = Extractor::default().extract(&method("Withdraw", stmts)).unwrap();
    assert!(!extraction.is_partial());
    assert_eq!(
        kinds(&extraction.contracts),
        vec![ClauseKind::Requires, ClauseKind::Requires, ClauseKind::Ensures]
    );

    let rendered: Vec<String> = extraction.contracts.iter().map(|c| c.to_string()).collect();
    assert_eq!(
        rendered,
        vec![
            "Requires: amount > 0",
            "Requires: memo != null",
            "Ensures: loc0 >= 0",
        ]
    );
    assert_eq!(
        extraction.contracts.clauses()[1].message.as_deref(),
        Some("memo required")
    );
}

#[test]
fn stack_dependent_clause_is_reported_with_its_position() {
    let dup_check = Node::binary(BinOp::Gt, Node::stack_duplicate(), Node::literal(ConstValue::I32(0)));
    let stmts = vec![
        contract("Requires", vec![amount_positive()]),
        contract("Requires", vec![dup_check]),
        contract("Requires", vec![memo_not_null()]),
    ];

    let extraction = Extractor::default().extract(&method("Deposit", stmts)).unwrap();
    assert_eq!(extraction.contracts.len(), 2);
    assert_eq!(extraction.diagnostics.len(), 1);

    let diagnostic = &extraction.diagnostics[0];
    assert_eq!(diagnostic.position().statement_index, 1);
    assert_eq!(
        diagnostic.to_string(),
        "unextractable Requires clause at statement 1: `<dup> > 0` depends on 1 duplicated stack value(s)"
    );
}

#[test]
fn accepted_clauses_are_stack_balanced() {
    let stmts = vec![
        contract("Requires", vec![Node::binary(BinOp::LogicalAnd, amount_positive(), Node::stack_duplicate())]),
        contract("Invariant", vec![memo_not_null()]),
    ];
    let extraction = Extractor::default().extract(&method("Audit", stmts)).unwrap();
    for clause in &extraction.contracts {
        assert_eq!(count_stack_markers(&clause.condition).unwrap(), 0);
    }
    assert_eq!(kinds(&extraction.contracts), vec![ClauseKind::Invariant]);
}

#[test]
fn malformed_method_names_itself() {
    let stmts = vec![Node::unrecognized("ldftn", vec![amount_positive()])];
    let err = Extractor::default()
        .extract(&method("Transfer", stmts))
        .unwrap_err();
    assert!(matches!(err, ExtractError::MalformedTree { .. }));
    assert_eq!(
        err.to_string(),
        "malformed tree in Bank.Account::Transfer: no traversal rule for node kind 'ldftn'"
    );
}

#[test]
fn nested_unrecognized_node_also_fails() {
    let stmts = vec![
        contract("Requires", vec![amount_positive()]),
        post(Node::unrecognized("calli", vec![])),
    ];
    assert!(Extractor::default().extract(&method("Transfer", stmts)).is_err());
}

#[test]
fn config_loaded_from_json_drives_extraction() {
    let json = r#"{
        "contract_methods": [
            { "callee": { "declaring_type": "Acme.Check", "name": "Arg" }, "arity": 1, "kind": "Requires" },
            { "callee": { "declaring_type": "Acme.Check", "name": "Result" }, "arity": 1, "kind": "Ensures" }
        ],
        "end_contract_block": null,
        "legacy_rule": "always-requires"
    }"#;
    let config = ExtractorConfig::from_json(json).unwrap();
    assert_eq!(
        config.contract_methods[0],
        ContractMethod::new(CalleeRef::new("Acme.Check", "Arg"), 1, ClauseKind::Requires)
    );

    let stmts = vec![
        Node::call(CalleeRef::new("Acme.Check", "Arg"), vec![amount_positive()]),
        contract("Requires", vec![memo_not_null()]),
        post(Node::arg(0, "amount")),
        Node::conditional(memo_not_null(), throw_argument(), None),
        Node::call(CalleeRef::new("Acme.Check", "Result"), vec![Node::arg(1, "memo")]),
    ];
    let extraction = Extractor::new(config).extract(&method("Custom", stmts)).unwrap();
    assert_eq!(
        kinds(&extraction.contracts),
        vec![ClauseKind::Requires, ClauseKind::Requires, ClauseKind::Ensures]
    );
    assert_eq!(extraction.contracts.clauses()[1].condition.to_string(), "memo == null");
}

#[test]
fn extraction_serializes_for_reports() {
    let stmts = vec![
        contract("Requires", vec![amount_positive()]),
        contract("Ensures", vec![Node::not(Node::stack_duplicate())]),
    ];
    let extraction = Extractor::default().extract(&method("Withdraw", stmts)).unwrap();
    let json = serde_json::to_string(&extraction).unwrap();
    let back: Extraction = serde_json::from_str(&json).unwrap();
    assert_eq!(back, extraction);
    assert!(matches!(
        back.diagnostics[0],
        ExtractionDiagnostic::UnextractableClause { stack_markers: 1, .. }
    ));
}

#[test]
fn legacy_rule_only_affects_trailing_guards() {
    let stmts = vec![
        Node::conditional(Node::not(amount_positive()), throw_argument(), None),
        post(Node::arg(0, "amount")),
        Node::conditional(Node::not(memo_not_null()), throw_argument(), None),
    ];
    let body = method("Close", stmts);

    let default = Extractor::default().extract(&body).unwrap();
    let always = Extractor::new(
        ExtractorConfig::default().with_legacy_rule(LegacyPositionRule::AlwaysRequires),
    )
    .extract(&body)
    .unwrap();

    assert_eq!(
        kinds(&default.contracts),
        vec![ClauseKind::Requires, ClauseKind::Ensures]
    );
    assert_eq!(
        kinds(&always.contracts),
        vec![ClauseKind::Requires, ClauseKind::Requires]
    );
    assert_eq!(
        default.contracts.clauses()[0].condition,
        always.contracts.clauses()[0].condition
    );
}

// Random statement lists built from contract calls, guards, and plain work.
fn statement() -> impl Strategy<Value = NodeRef> {
    let condition = prop_oneof![
        Just(amount_positive()),
        Just(memo_not_null()),
        Just(Node::stack_duplicate()),
        Just(Node::not(Node::stack_duplicate())),
        (0u16..4).prop_map(|i| Node::arg(i, "p")),
    ];
    (0u8..5, condition).prop_map(|(shape, cond)| match shape {
        0 => contract("Requires", vec![cond]),
        1 => contract("Ensures", vec![cond]),
        2 => Node::conditional(Node::not(cond), throw_argument(), None),
        3 => post(cond),
        _ => Node::ret(Some(cond)),
    })
}

#[test]
fn extraction_with_nan_literal_is_idempotent() {
    let body = method(
        "Scale",
        vec![contract(
            "Requires",
            vec![Node::binary(
                BinOp::Ne,
                Node::arg(0, "amount"),
                Node::literal(ConstValue::F64(f64::NAN)),
            )],
        )],
    );
    let extractor = Extractor::default();
    let first = extractor.extract(&body).unwrap();
    assert_eq!(first.contracts.len(), 1);
    assert_eq!(first, extractor.extract(&body).unwrap());
}

proptest! {
    #[test]
    fn extraction_is_deterministic(stmts in prop::collection::vec(statement(), 0..12)) {
        let body = method("Random", stmts);
        let extractor = Extractor::default();
        let first = extractor.extract(&body).unwrap();
        let second = extractor.extract(&body).unwrap();
        prop_assert_eq!(&first, &second);

        for clause in &first.contracts {
            prop_assert_eq!(count_stack_markers(&clause.condition).unwrap(), 0);
        }
        let mut indices: Vec<usize> = first
            .contracts
            .iter()
            .map(|c| c.position.statement_index)
            .chain(first.diagnostics.iter().map(|d| d.position().statement_index))
            .collect();
        let total = indices.len();
        indices.sort_unstable();
        indices.dedup();
        prop_assert_eq!(indices.len(), total);
    }
}
