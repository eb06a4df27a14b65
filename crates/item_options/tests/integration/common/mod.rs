//! Common host fixture for item-options integration tests.

use std::sync::{Arc, LazyLock};

use item_options::{
	DefinitionConfig, DefinitionRegistry, EnumType, OptionHost, OptionIndex, OptionRow, PersistFlags, RowId, RowSet, Value,
};

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt::try_init();
}

pub static STATUS: LazyLock<Arc<EnumType>> = LazyLock::new(|| {
	EnumType::new("Status", [("Draft", "draft"), ("Published", "published"), ("Archived", "archived")])
		.expect("status enum is valid")
});

static ARTICLE_OPTIONS: LazyLock<DefinitionRegistry<Article>> = LazyLock::new(|| {
	let draft = STATUS.case("Draft").expect("draft case");
	DefinitionRegistry::from_entries([
		("status", DefinitionConfig::new().enum_type(STATUS.clone()).default_value(draft)),
		("tags", DefinitionConfig::new().multiple(true)),
		("layout", DefinitionConfig::new().default_value("wide")),
		("comments", DefinitionConfig::new().allow(PersistFlags::FALSE)),
		("sponsor", DefinitionConfig::new().requirement(|article: &Article| article.paid)),
	])
	.expect("article options are valid")
});

/// Stored option row with bookkeeping the options layer never touches.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleOption {
	pub name: String,
	pub value: Value,
	pub revision: u32,
}

impl OptionRow for ArticleOption {
	fn with_key(key: &str) -> Self {
		Self {
			name: key.to_string(),
			value: Value::Null,
			revision: 0,
		}
	}

	fn key(&self) -> &str {
		&self.name
	}

	fn value(&self) -> &Value {
		&self.value
	}

	fn set_value(&mut self, value: Value) {
		self.value = value;
		self.revision += 1;
	}
}

#[derive(Debug, Default)]
pub struct Article {
	pub paid: bool,
	pub options: RowSet<ArticleOption>,
	pub index: OptionIndex,
	pub deleted: Vec<RowId>,
}

impl Article {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a row behind the options layer's back, like a freshly loaded record.
	pub fn load(&mut self, key: &str, value: impl Into<Value>) -> RowId {
		let mut row = ArticleOption::with_key(key);
		row.value = value.into();
		self.options.insert(row)
	}

	pub fn row(&self, id: RowId) -> Option<&ArticleOption> {
		self.options.get(id)
	}
}

impl OptionHost for Article {
	type Row = ArticleOption;

	fn option_definitions(&self) -> &DefinitionRegistry<Self> {
		&ARTICLE_OPTIONS
	}

	fn option_rows(&self) -> &RowSet<ArticleOption> {
		&self.options
	}

	fn option_rows_mut(&mut self) -> &mut RowSet<ArticleOption> {
		&mut self.options
	}

	fn option_index(&self) -> &OptionIndex {
		&self.index
	}

	fn option_index_mut(&mut self) -> &mut OptionIndex {
		&mut self.index
	}

	fn remove_option_row(&mut self, id: RowId) -> Option<ArticleOption> {
		let row = self.options.remove(id)?;
		self.deleted.push(id);
		Some(row)
	}
}
