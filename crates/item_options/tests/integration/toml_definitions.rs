use std::io::Write;

use item_options::{
	DefinitionRegistry, EnumCatalog, ItemOptions, OptionHost, OptionIndex, Row, RowSet, Value, load_registry_file,
	parse_definitions,
};
use pretty_assertions::assert_eq;

use crate::common::init_tracing;

const PAGE_OPTIONS: &str = r#"
[enums.Theme]
light = 1
dark = 2

[options]
theme = { enum_type = "Theme", default = 1 }
aliases = { multiple = true }
hidden = { allow_false = true }
note = true
"#;

struct Page {
	defs: DefinitionRegistry<Page>,
	rows: RowSet<Row>,
	index: OptionIndex,
	owner: Option<String>,
}

impl OptionHost for Page {
	type Row = Row;

	fn option_definitions(&self) -> &DefinitionRegistry<Self> {
		&self.defs
	}

	fn option_rows(&self) -> &RowSet<Row> {
		&self.rows
	}

	fn option_rows_mut(&mut self) -> &mut RowSet<Row> {
		&mut self.rows
	}

	fn option_index(&self) -> &OptionIndex {
		&self.index
	}

	fn option_index_mut(&mut self) -> &mut OptionIndex {
		&mut self.index
	}
}

fn page(defs: DefinitionRegistry<Page>) -> Page {
	Page {
		defs,
		rows: RowSet::new(),
		index: OptionIndex::new(),
		owner: None,
	}
}

#[test]
fn file_definitions_drive_a_host() {
	init_tracing();
	let mut file = tempfile::NamedTempFile::new().unwrap();
	file.write_all(PAGE_OPTIONS.as_bytes()).unwrap();

	let mut page = page(load_registry_file(file.path()).unwrap());

	assert_eq!(page.option_value("theme", None).unwrap().as_enum().map(|m| m.name()), Some("light"));

	page.reconcile_option("hidden", Value::Bool(false)).unwrap();
	page.reconcile_option("aliases", Value::from(vec!["home", "index"])).unwrap();
	page.reconcile_option("note", Value::from("draft")).unwrap();
	assert_eq!(page.rows.len(), 4);

	page.reconcile_option("note", Value::Null).unwrap();
	assert!(!page.has_option("note").unwrap());
}

#[test]
fn enum_values_from_definitions_store_their_scalar() {
	init_tracing();
	let defs = parse_definitions::<Page>(PAGE_OPTIONS, EnumCatalog::new()).unwrap();
	let dark = defs.enums.get("Theme").unwrap().case("dark").unwrap();
	let mut page = page(defs.registry);

	page.reconcile_option("theme", Value::Enum(dark.clone())).unwrap();
	assert_eq!(page.rows.iter().map(|(_, r)| r.value.clone()).collect::<Vec<_>>(), [Value::Int(2)]);
	assert_eq!(page.option_value("theme", None).unwrap(), Value::Enum(dark));
}

#[test]
fn requirements_attach_after_loading() {
	init_tracing();
	let defs = parse_definitions::<Page>(PAGE_OPTIONS, EnumCatalog::new())
		.unwrap()
		.registry
		.with_requirement("note", |page: &Page| page.owner.is_some())
		.unwrap();
	let mut page = page(defs);

	assert!(page.reconcile_option("note", Value::from("x")).is_err());
	page.owner = Some("ada".to_string());
	page.reconcile_option("note", Value::from("x")).unwrap();
	assert_eq!(page.option_value("note", None).unwrap(), Value::from("x"));
}
