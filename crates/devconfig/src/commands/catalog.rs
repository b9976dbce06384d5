//! Catalog listing handlers: zones, aliases, device types, fields.

use serde::Serialize;
use tabled::Tabled;

use devconfig_core::{Catalog, CoreError, FieldDefinition, FieldSelector, Zone};

use super::CliEngine;
use crate::cli::{FieldsArgs, GlobalOpts, ScopeFilter, ZonesArgs};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "Zone")]
    name: String,
    #[tabled(rename = "Aliases")]
    aliases: String,
    #[tabled(rename = "Device types")]
    device_types: String,
}

impl From<&Zone> for ZoneRow {
    fn from(z: &Zone) -> Self {
        Self {
            name: z.name.clone(),
            aliases: join(&z.aliases),
            device_types: join(&z.device_types),
        }
    }
}

#[derive(Serialize)]
struct AliasEntry {
    alias: String,
    zones: Vec<String>,
}

#[derive(Tabled)]
struct AliasRow {
    #[tabled(rename = "Alias")]
    alias: String,
    #[tabled(rename = "Zones")]
    zones: String,
}

#[derive(Serialize)]
struct TypeEntry {
    name: String,
    display_name: String,
    identity_field: String,
    summary_fields: Vec<String>,
    log_level: Option<String>,
    zones: Vec<String>,
    fields: Option<usize>,
    load_error: Option<String>,
}

#[derive(Tabled)]
struct TypeRow {
    #[tabled(rename = "Type")]
    name: String,
    #[tabled(rename = "Display")]
    display_name: String,
    #[tabled(rename = "Identity")]
    identity_field: String,
    #[tabled(rename = "Zones")]
    zones: String,
    #[tabled(rename = "Log level")]
    log_level: String,
    #[tabled(rename = "Schema")]
    schema: String,
}

impl From<&TypeEntry> for TypeRow {
    fn from(t: &TypeEntry) -> Self {
        Self {
            name: t.name.clone(),
            display_name: t.display_name.clone(),
            identity_field: t.identity_field.clone(),
            zones: t.zones.join(", "),
            log_level: t.log_level.clone().unwrap_or_default(),
            schema: match (&t.fields, &t.load_error) {
                (Some(n), _) => format!("{n} fields"),
                (None, Some(err)) => format!("failed: {err}"),
                (None, None) => String::new(),
            },
        }
    }
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Alias")]
    alias: String,
    #[tabled(rename = "Scope")]
    scope: String,
    #[tabled(rename = "Suffix")]
    suffix: String,
    #[tabled(rename = "Values")]
    labels: String,
    #[tabled(rename = "Description")]
    tooltip: String,
}

impl From<&FieldDefinition> for FieldRow {
    fn from(f: &FieldDefinition) -> Self {
        Self {
            key: f.key.clone(),
            alias: f.alias.clone(),
            scope: f.scope.to_string(),
            suffix: f.suffix.clone(),
            labels: f.enum_labels.as_deref().map(|l| l.join("/")).unwrap_or_default(),
            tooltip: f.tooltip.clone(),
        }
    }
}

fn join<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    items.into_iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

// ── Handlers ────────────────────────────────────────────────────────

pub fn zones(engine: &CliEngine, args: &ZonesArgs, global: &GlobalOpts) {
    let catalog = engine.catalog();
    output::print_warnings(&catalog.warnings(), &global.color, global.quiet);

    let out = if args.aliases {
        let entries: Vec<AliasEntry> = catalog
            .aliases()
            .iter()
            .map(|(alias, zones)| AliasEntry {
                alias: alias.clone(),
                zones: zones.iter().cloned().collect(),
            })
            .collect();
        output::render_list(
            &global.output,
            &entries,
            |a| AliasRow {
                alias: a.alias.clone(),
                zones: a.zones.join(", "),
            },
            |a| a.alias.clone(),
        )
    } else {
        let zones: Vec<Zone> = catalog
            .zone_names()
            .into_iter()
            .filter_map(|name| catalog.zone(name).cloned())
            .collect();
        output::render_list(&global.output, &zones, |z| ZoneRow::from(z), |z| z.name.clone())
    };
    output::print_output(&out, global.quiet);
}

pub fn types(engine: &CliEngine, global: &GlobalOpts) {
    let catalog = engine.catalog();
    output::print_warnings(&catalog.warnings(), &global.color, global.quiet);

    let entries = type_entries(&catalog);
    let out = output::render_list(
        &global.output,
        &entries,
        |t| TypeRow::from(t),
        |t| t.name.clone(),
    );
    output::print_output(&out, global.quiet);
}

fn type_entries(catalog: &Catalog) -> Vec<TypeEntry> {
    let pairs = catalog.zone_type_pairs();
    catalog
        .device_types()
        .map(|t| {
            let (fields, load_error) = match catalog.schema(&t.name) {
                Ok(schema) => (Some(schema.len()), None),
                Err(e) => (None, Some(schema_reason(e))),
            };
            TypeEntry {
                name: t.name.clone(),
                display_name: t.display_name.clone(),
                identity_field: t.identity_field.clone(),
                summary_fields: t.summary_fields.clone(),
                log_level: t.log_level.as_ref().map(ToString::to_string),
                zones: pairs
                    .iter()
                    .filter(|(_, ty)| *ty == t.name)
                    .map(|(zone, _)| (*zone).to_owned())
                    .collect(),
                fields,
                load_error,
            }
        })
        .collect()
}

fn schema_reason(err: CoreError) -> String {
    match err {
        CoreError::SchemaLoad { reason, .. } => reason,
        other => other.to_string(),
    }
}

pub fn fields(
    engine: &CliEngine,
    args: &FieldsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let catalog = engine.catalog();
    let device_type = catalog
        .device_type(&args.device_type)
        .ok_or_else(|| CoreError::InvalidDeviceType {
            input: vec![args.device_type.clone()],
        })?;

    let selector = match args.scope {
        ScopeFilter::All => FieldSelector::All,
        ScopeFilter::Object => FieldSelector::Object,
        ScopeFilter::Config => FieldSelector::Config,
        ScopeFilter::Summary => FieldSelector::Summary(&device_type.summary_fields),
    };
    let schema = catalog.schema(&device_type.name)?;
    let defs: Vec<FieldDefinition> = catalog
        .fields_where(&device_type.name, selector)?
        .into_iter()
        .filter_map(|key| schema.get(key).cloned())
        .collect();

    let out = output::render_list(&global.output, &defs, |f| FieldRow::from(f), |f| f.key.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}
