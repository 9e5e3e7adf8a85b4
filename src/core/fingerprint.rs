/// Structural world fingerprints for convergence detection.
use blake3::Hasher;

use crate::core::registry::NounRegistry;
use crate::core::relations::RelationStore;
use crate::schema::noun::Value;

/// 256-bit digest of a whole world state.
pub type Fingerprint = blake3::Hash;

/// Digest every noun (name, sorted tags, properties) in registry order
/// plus every relation edge. Equal world states always produce equal
/// fingerprints; tag-set iteration order does not leak in.
///
/// Every variable-length field is length-prefixed so adjacent fields
/// cannot run into each other.
pub fn fingerprint(nouns: &NounRegistry, relations: &RelationStore) -> Fingerprint {
    let mut hasher = Hasher::new();

    update_len(&mut hasher, nouns.len());
    for (_, noun) in nouns.iter() {
        update_str(&mut hasher, &noun.name);

        let mut tags: Vec<&String> = noun.tags.iter().collect();
        tags.sort();
        update_len(&mut hasher, tags.len());
        for tag in tags {
            update_str(&mut hasher, tag);
        }

        update_len(&mut hasher, noun.properties.len());
        for (key, value) in &noun.properties {
            update_str(&mut hasher, key);
            update_value(&mut hasher, value);
        }
    }

    update_len(&mut hasher, relations.len());
    for key in relations.iter() {
        update_str(&mut hasher, &key.relation);
        update_len(&mut hasher, key.subject.0);
        update_len(&mut hasher, key.object.0);
    }

    hasher.finalize()
}

fn update_len(hasher: &mut Hasher, n: usize) {
    hasher.update(&(n as u64).to_le_bytes());
}

fn update_str(hasher: &mut Hasher, s: &str) {
    update_len(hasher, s.len());
    hasher.update(s.as_bytes());
}

fn update_value(hasher: &mut Hasher, value: &Value) {
    match value {
        Value::String(s) => {
            hasher.update(&[0]);
            update_str(hasher, s);
        }
        Value::Float(x) => {
            hasher.update(&[1]);
            hasher.update(&x.to_bits().to_le_bytes());
        }
        Value::Int(n) => {
            hasher.update(&[2]);
            hasher.update(&n.to_le_bytes());
        }
        Value::Bool(b) => {
            hasher.update(&[3, u8::from(*b)]);
        }
    }
}
