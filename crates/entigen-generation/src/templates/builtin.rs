//! Built-in section templates
//!
//! Sources live under the crate's `templates/` directory, one `.hbs` file per section.

use crate::planner::Section;

/// Built-in template source of a section
pub fn builtin_source(section: Section) -> &'static str {
    match section {
        Section::ModelHeader => include_str!("../../templates/model/header.hbs"),
        Section::Record => include_str!("../../templates/model/record.hbs"),
        Section::CreateRequest => include_str!("../../templates/model/create_request.hbs"),
        Section::UpdateRequest => include_str!("../../templates/model/update_request.hbs"),
        Section::PatchRequest => include_str!("../../templates/model/patch_request.hbs"),
        Section::RepositoryContract => include_str!("../../templates/repository/contract.hbs"),
        Section::SqlRepository => include_str!("../../templates/repository/sql.hbs"),
        Section::PostgresInsert => include_str!("../../templates/repository/postgres_insert.hbs"),
        Section::MySqlInsert => include_str!("../../templates/repository/mysql_insert.hbs"),
        Section::SqlQueries => include_str!("../../templates/repository/sql_queries.hbs"),
        Section::CommaListCodec => include_str!("../../templates/repository/comma_list.hbs"),
        Section::MongoRepository => include_str!("../../templates/repository/mongo.hbs"),
        Section::Service => include_str!("../../templates/service/core.hbs"),
        Section::ServiceUpdate => include_str!("../../templates/service/update.hbs"),
        Section::ServicePatch => include_str!("../../templates/service/patch.hbs"),
        Section::Handler => include_str!("../../templates/handler/core.hbs"),
        Section::IntegerIdParser => include_str!("../../templates/handler/integer_id.hbs"),
        Section::ObjectIdParser => include_str!("../../templates/handler/object_id.hbs"),
        Section::HandlerUpdate => include_str!("../../templates/handler/update.hbs"),
        Section::HandlerPatch => include_str!("../../templates/handler/patch.hbs"),
        Section::Routes => include_str!("../../templates/routes/fragment.hbs"),
        Section::MigrationUp => include_str!("../../templates/migration/up.hbs"),
        Section::MigrationDown => include_str!("../../templates/migration/down.hbs"),
        Section::InitScript => include_str!("../../templates/migration/init_script.hbs"),
        Section::Docs => include_str!("../../templates/docs/overview.hbs"),
        Section::DocsUpdate => include_str!("../../templates/docs/update.hbs"),
        Section::DocsPatch => include_str!("../../templates/docs/patch.hbs"),
    }
}
