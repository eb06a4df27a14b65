use item_options::reconcile::{apply, plan};
use item_options::{
	Error, FieldAccess, FieldBinding, FieldMap, FieldPath, ItemOptions, OptionBindings, OptionRows, RowOp, Value,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::common::{Article, STATUS, init_tracing};

#[test]
fn fresh_article_reads_defaults() {
	init_tracing();
	let article = Article::new();

	assert_eq!(article.option_value("status", None).unwrap(), Value::Enum(STATUS.case("Draft").unwrap()));
	assert_eq!(article.option_value("layout", None).unwrap(), Value::from("wide"));
	assert_eq!(article.option_value("tags", None).unwrap(), Value::empty_seq());
	assert!(!article.has_options(["status", "tags", "layout"], false).unwrap());
}

#[test]
fn loaded_scalars_come_back_as_enum_members() {
	init_tracing();
	let mut article = Article::new();
	article.load("status", "published");

	assert_eq!(
		article.option_value("status", None).unwrap(),
		Value::Enum(STATUS.case("Published").unwrap())
	);
}

#[test]
fn updates_keep_row_bookkeeping() {
	init_tracing();
	let mut article = Article::new();
	let layout = article.load("layout", "narrow");
	let tag = article.load("tags", "rust");

	article.reconcile_option("layout", Value::from("grid")).unwrap();
	article
		.reconcile_option("tags", Value::from(vec!["rust", "options"]))
		.unwrap();

	assert_eq!(article.row(layout).unwrap().revision, 1);
	assert_eq!(article.row(tag).unwrap().revision, 0);
	assert!(article.deleted.is_empty());
	assert_eq!(article.option_value("tags", None).unwrap(), Value::from(vec!["rust", "options"]));
}

#[test]
fn removals_go_through_the_host_hook() {
	init_tracing();
	let mut article = Article::new();
	let status = article.load("status", "published");
	let first = article.load("tags", "a");
	article.load("tags", "b");

	article
		.reconcile_option("status", Value::Enum(STATUS.case("Draft").unwrap()))
		.unwrap();
	article.reconcile_option("tags", Value::from(vec!["b"])).unwrap();

	assert_eq!(article.deleted, [status, first]);
	assert!(!article.has_option("status").unwrap());
	assert_eq!(article.options.len(), 1);
}

#[test]
fn enum_members_are_persisted_as_scalars() {
	init_tracing();
	let mut article = Article::new();
	article
		.reconcile_option("status", Value::Enum(STATUS.case("Archived").unwrap()))
		.unwrap();

	match article.option("status").unwrap() {
		Some(OptionRows::Single(row)) => assert_eq!(row.value, Value::from("archived")),
		other => panic!("expected one status row, got {other:?}"),
	}
}

#[test]
fn requirement_gates_sponsor() {
	init_tracing();
	let mut article = Article::new();
	assert!(matches!(
		article.reconcile_option("sponsor", Value::from("acme")),
		Err(Error::IneligibleHost { .. })
	));

	article.paid = true;
	article.reconcile_option("sponsor", Value::from("acme")).unwrap();
	assert_eq!(article.option_value("sponsor", None).unwrap(), Value::from("acme"));
}

#[test]
fn plan_can_be_inspected_before_applying() {
	init_tracing();
	let mut article = Article::new();
	let kept = article.load("tags", "x");

	let plan = plan(&article, "tags", Value::from(vec!["x", "y"])).unwrap();
	assert_eq!(plan.ops(), [RowOp::Insert { value: Value::from("y") }]);

	let report = apply(&mut article, plan).unwrap();
	assert_eq!(report.inserted.len(), 1);
	assert!(article.row(kept).is_some());
	assert!(article.has_option("tags").unwrap());
}

#[test]
fn form_round_trip() {
	init_tracing();
	let mut bindings = OptionBindings::new();
	bindings
		.bind("status", FieldBinding::default())
		.unwrap()
		.bind("tags", FieldBinding::default().parent("meta"))
		.unwrap()
		.bind("comments", FieldBinding::default().field("allow_comments"))
		.unwrap();

	let mut submitted = FieldMap::new();
	submitted
		.declare(FieldPath::new("status"), STATUS.case("Published").unwrap())
		.declare(FieldPath::nested("meta", "tags"), vec!["a", "b"])
		.declare(FieldPath::new("allow_comments"), false);

	let mut article = Article::new();
	let reports = bindings.submit(&mut article, &submitted).unwrap();
	assert_eq!(reports.len(), 3);
	assert_eq!(article.options.len(), 4);

	let mut shown = FieldMap::new();
	shown
		.declare(FieldPath::new("status"), Value::Null)
		.declare(FieldPath::nested("meta", "tags"), Value::Null)
		.declare(FieldPath::new("allow_comments"), Value::Null);
	bindings.populate(&article, &mut shown).unwrap();

	assert_eq!(shown, submitted);
	assert_eq!(shown.field_value(&FieldPath::new("allow_comments")), Some(Value::Bool(false)));
}

proptest! {
	#[test]
	fn reconciling_twice_is_a_noop(tags in prop::collection::vec("[a-c]{0,2}", 0..6), layout in "[a-z]{0,6}") {
		let mut article = Article::new();
		article.reconcile_option("tags", Value::from(tags.clone())).unwrap();
		article.reconcile_option("layout", Value::from(layout.clone())).unwrap();

		let tags_again = article.reconcile_option("tags", Value::from(tags)).unwrap();
		prop_assert!(tags_again.is_noop());
		let layout_again = article.reconcile_option("layout", Value::from(layout)).unwrap();
		prop_assert!(!layout_again.changed_rows());
	}
}
