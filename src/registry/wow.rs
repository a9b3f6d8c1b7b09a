//! World of Warcraft community endpoints.

use super::{Endpoint, EndpointRegistry, Params};
use crate::Result;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// RFC 3986 unreserved characters stay literal; everything else is encoded.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub const CHARACTER_FIELDS: &[&str] = &[
    "achievements",
    "appearance",
    "audit",
    "feed",
    "guild",
    "hunterPets",
    "items",
    "mounts",
    "pets",
    "petSlots",
    "progression",
    "pvp",
    "quests",
    "reputation",
    "statistics",
    "stats",
    "talents",
    "titles",
];

pub const GUILD_FIELDS: &[&str] = &["achievements", "challenge", "members", "news"];

pub(super) fn register(registry: &mut EndpointRegistry) {
    registry.register("wow", "achievement", achievement);
    registry.register("wow", "character", character);
    registry.register("wow", "guild", guild);
    registry.register("wow", "item", item);
    registry.register("wow", "item/set", item_set);
    registry.register("wow", "mount", mount);
    registry.register("wow", "quest", quest);
    registry.register("wow", "recipe", recipe);
    registry.register("wow", "spell", spell);
    registry.register("wow", "realm/status", realm_status);
}

fn encode(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Keep requested fields that appear in `valid`, in request order.
fn filter_fields(raw: &str, valid: &[&str]) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|f| valid.contains(f))
        .map(str::to_string)
        .collect()
}

/// `{prefix}{id}` endpoints.
#[derive(Debug)]
struct ById {
    prefix: &'static str,
    id: String,
}

impl Endpoint for ById {
    fn path(&self) -> String {
        format!("{}{}", self.prefix, encode(&self.id))
    }
}

fn by_id(params: &Params, prefix: &'static str, key: &str) -> Result<Box<dyn Endpoint>> {
    let [id] = params.require(prefix, [key])?;
    Ok(Box::new(ById {
        prefix,
        id: id.to_string(),
    }))
}

/// Parameterless endpoints.
#[derive(Debug)]
struct Static(&'static str);

impl Endpoint for Static {
    fn path(&self) -> String {
        self.0.to_string()
    }
}

/// `/wow/{kind}/{realm}/{name}` with an optional `fields` list.
#[derive(Debug)]
struct Profile {
    kind: &'static str,
    realm: String,
    name: String,
    fields: Option<Vec<String>>,
}

impl Endpoint for Profile {
    fn path(&self) -> String {
        let mut path = format!(
            "/wow/{}/{}/{}",
            self.kind,
            encode(&self.realm),
            encode(&self.name)
        );
        if let Some(fields) = self.fields.as_ref().filter(|f| !f.is_empty()) {
            path.push_str("?fields=");
            path.push_str(&fields.join(","));
        }
        path
    }
}

fn achievement(params: &Params) -> Result<Box<dyn Endpoint>> {
    by_id(params, "/wow/achievement/", "id")
}

fn character(params: &Params) -> Result<Box<dyn Endpoint>> {
    let [realm, name] = params.require("/wow/character/", ["realm", "characterName"])?;
    Ok(Box::new(Profile {
        kind: "character",
        realm: realm.to_string(),
        name: name.to_string(),
        fields: params
            .get("fields")
            .map(|raw| filter_fields(raw, CHARACTER_FIELDS)),
    }))
}

fn guild(params: &Params) -> Result<Box<dyn Endpoint>> {
    let [realm, name] = params.require("/wow/guild/", ["realm", "guildName"])?;
    Ok(Box::new(Profile {
        kind: "guild",
        realm: realm.to_string(),
        name: name.to_string(),
        fields: params.get("fields").map(|raw| filter_fields(raw, GUILD_FIELDS)),
    }))
}

fn item(params: &Params) -> Result<Box<dyn Endpoint>> {
    by_id(params, "/wow/item/", "itemId")
}

fn item_set(params: &Params) -> Result<Box<dyn Endpoint>> {
    by_id(params, "/wow/item/set/", "setId")
}

fn mount(_: &Params) -> Result<Box<dyn Endpoint>> {
    Ok(Box::new(Static("/wow/mount/")))
}

fn quest(params: &Params) -> Result<Box<dyn Endpoint>> {
    by_id(params, "/wow/quest/", "questId")
}

fn recipe(params: &Params) -> Result<Box<dyn Endpoint>> {
    by_id(params, "/wow/recipe/", "recipeId")
}

fn spell(params: &Params) -> Result<Box<dyn Endpoint>> {
    by_id(params, "/wow/spell/", "spellId")
}

fn realm_status(_: &Params) -> Result<Box<dyn Endpoint>> {
    Ok(Box::new(Static("/wow/realm/status")))
}
