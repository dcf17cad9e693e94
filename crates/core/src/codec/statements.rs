//! Snaks, qualifiers, references and claims ↔ wire JSON

use wikibase_domain::{
    Claim, ClaimGuid, Datatype, EntityId, Qualifier, QualifierHash, Rank, Reference,
    ReferenceHash, Result, Snak, SnakType, WikibaseError,
};

use super::values::{decode_value, encode_value};
use super::wire::{SnakGroups, WireClaim, WireReference, WireSnak};

pub fn encode_snak(snak: &Snak) -> WireSnak {
    WireSnak {
        snaktype: snak.snak_type().as_str().to_string(),
        property: snak.property().to_string(),
        hash: None,
        datavalue: snak.data_value().map(encode_value),
        datatype: snak.datatype().map(|d| d.as_str().to_string()),
    }
}

/// # Errors
/// Returns [`WikibaseError::UnexpectedResponse`] for unknown snak types,
/// bad property ids, or a `value` snak without a payload.
pub fn decode_snak(wire: &WireSnak) -> Result<Snak> {
    let property = EntityId::parse(&wire.property).map_err(unexpected)?;
    let snak_type: SnakType = wire
        .snaktype
        .parse()
        .map_err(|e: String| WikibaseError::UnexpectedResponse(e))?;
    let datatype = wire.datatype.as_deref().map(|raw| match raw.parse::<Datatype>() {
        Ok(datatype) => datatype,
        Err(never) => match never {},
    });
    let value = match (&wire.datavalue, snak_type) {
        (Some(data), SnakType::Value) => Some(decode_value(data, datatype.as_ref())?),
        _ => None,
    };
    let snak = Snak::with_type(property, snak_type, value).ok_or_else(|| {
        WikibaseError::UnexpectedResponse(format!("value snak for {} has no datavalue", wire.property))
    })?;
    Ok(match datatype {
        Some(datatype) => snak.with_datatype(datatype),
        None => snak,
    })
}

/// Group snaks by property, keeping first-appearance order.
pub fn group_snaks<'a, I>(snaks: I) -> (SnakGroups, Vec<String>)
where
    I: IntoIterator<Item = (&'a Snak, Option<String>)>,
{
    let mut groups = SnakGroups::new();
    let mut order = Vec::new();
    for (snak, hash) in snaks {
        let property = snak.property().to_string();
        if !groups.contains_key(&property) {
            order.push(property.clone());
        }
        let mut wire = encode_snak(snak);
        wire.hash = hash;
        groups.entry(property).or_default().push(wire);
    }
    (groups, order)
}

/// Walk grouped snaks in `order`, then any groups `order` does not list.
fn ordered_snaks<'a>(groups: &'a SnakGroups, order: &'a [String]) -> impl Iterator<Item = &'a WireSnak> {
    let listed = order.iter().filter_map(|property| groups.get(property));
    let unlisted = groups
        .iter()
        .filter(|(property, _)| !order.contains(property))
        .map(|(_, snaks)| snaks);
    listed.chain(unlisted).flatten()
}

pub fn encode_reference(reference: &Reference) -> WireReference {
    let (snaks, snaks_order) = group_snaks(reference.snaks.iter().map(|snak| (snak, None)));
    WireReference {
        hash: reference.hash.as_ref().map(|h| h.as_str().to_string()),
        snaks,
        snaks_order,
    }
}

/// # Errors
/// Propagates snak decoding failures.
pub fn decode_reference(wire: &WireReference) -> Result<Reference> {
    let snaks = ordered_snaks(&wire.snaks, &wire.snaks_order)
        .map(decode_snak)
        .collect::<Result<Vec<_>>>()?;
    Ok(Reference { hash: wire.hash.as_deref().map(ReferenceHash::from), snaks })
}

pub fn encode_claim(claim: &Claim) -> WireClaim {
    let (qualifiers, qualifiers_order) = group_snaks(
        claim
            .qualifiers
            .iter()
            .map(|q| (&q.snak, q.hash.as_ref().map(|h| h.as_str().to_string()))),
    );
    WireClaim {
        id: claim.id.as_ref().map(|id| id.as_str().to_string()),
        kind: "statement".to_string(),
        mainsnak: encode_snak(&claim.main_snak),
        qualifiers,
        qualifiers_order,
        references: claim.references.iter().map(encode_reference).collect(),
        rank: claim.rank.as_str().to_string(),
    }
}

/// # Errors
/// Returns [`WikibaseError::UnexpectedResponse`] if any part of the claim
/// is malformed.
pub fn decode_claim(wire: &WireClaim) -> Result<Claim> {
    let id = wire.id.as_deref().map(ClaimGuid::parse).transpose().map_err(unexpected)?;
    let rank: Rank = wire.rank.parse().map_err(|e: String| WikibaseError::UnexpectedResponse(e))?;
    let qualifiers = ordered_snaks(&wire.qualifiers, &wire.qualifiers_order)
        .map(|snak| -> Result<Qualifier> {
            let hash = snak.hash.as_deref().map(QualifierHash::from);
            Ok(Qualifier { hash, snak: decode_snak(snak)? })
        })
        .collect::<Result<Vec<_>>>()?;
    let references = wire.references.iter().map(decode_reference).collect::<Result<Vec<_>>>()?;
    Ok(Claim { id, main_snak: decode_snak(&wire.mainsnak)?, qualifiers, references, rank })
}

/// Ids the server sends back failing to parse means the response, not the
/// caller, is at fault.
fn unexpected(err: WikibaseError) -> WikibaseError {
    match err {
        WikibaseError::InvalidInput(message) => WikibaseError::UnexpectedResponse(message),
        other => other,
    }
}
