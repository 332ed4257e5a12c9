// src/photos.rs

use crate::store::{BlobStore, StoreError};
use regex::Regex;

pub const INCOMING_PREFIX: &str = "photos-incoming";
pub const PERMANENT_PREFIX: &str = "photos";

/// Upper- and lowercase variants both occur in uploads from phones.
const IMG_EXT: [&str; 10] = [
    ".jpg", ".jpeg", ".png", ".webp", ".gif", ".JPG", ".JPEG", ".PNG", ".WEBP", ".GIF",
];

pub fn base_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or("")
}

fn has_image_ext(name: &str) -> bool {
    IMG_EXT.iter().any(|ext| name.ends_with(ext))
}

/// Result of a two-step photo move.
pub struct MovedPhoto {
    pub dest: String,
    pub source_deleted: bool,
}

/// Discovers photos waiting under the incoming area for one listing and
/// moves them to their permanent home.
pub struct PhotoMatcher<'a> {
    store: &'a dyn BlobStore,
}

impl<'a> PhotoMatcher<'a> {
    pub fn new(store: &'a dyn BlobStore) -> Self {
        Self { store }
    }

    /// Candidate keys for a listing: everything in the listing's incoming
    /// folder plus flat files named exactly after the identifier.
    pub fn find_candidates(&self, listing_id: &str) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();

        let folder = format!("{INCOMING_PREFIX}/{listing_id}/");
        for obj in self.store.list(&folder)? {
            if has_image_ext(base_name(&obj.key)) {
                keys.push(obj.key);
            }
        }

        for ext in IMG_EXT {
            let flat = format!("{INCOMING_PREFIX}/{listing_id}{ext}");
            if self.store.exists(&flat)? {
                keys.push(flat);
            }
        }

        keys.dedup();
        Ok(keys)
    }

    /// Copy the candidate into `photos/{id}/` and delete the source.
    /// Non-atomic two-step: a copy failure is an error, but a delete failure
    /// after a successful copy returns the destination with
    /// `source_deleted = false` so the caller can report the orphan.
    pub fn move_candidate(&self, src: &str, listing_id: &str) -> Result<MovedPhoto, StoreError> {
        let dest = permanent_key(src, listing_id);
        let bytes = self
            .store
            .get(src)?
            .ok_or_else(|| StoreError::Io(format!("source object missing: {src}")))?;
        self.store.put(&dest, &bytes)?;
        let source_deleted = self.store.delete(src).is_ok();
        Ok(MovedPhoto {
            dest,
            source_deleted,
        })
    }
}

pub fn permanent_key(src: &str, listing_id: &str) -> String {
    format!("{PERMANENT_PREFIX}/{listing_id}/{}", base_name(src))
}

/// Score moved keys and pick one as the listing's primary photo. Exact
/// identifier names win, then filename hints, with a small bonus for jpeg
/// over other formats. First listed wins ties.
pub fn choose_primary(dest_keys: &[String], listing_id: &str) -> Option<String> {
    let id = listing_id.to_lowercase();
    let main_cover = Regex::new(r"(?i)/(main|cover)\.").expect("static pattern compiles");
    let front_one = Regex::new(r"(?i)/(1|front)\.").expect("static pattern compiles");
    let jpeg = Regex::new(r"\.(jpg|jpeg)$").expect("static pattern compiles");

    let mut best: Option<(&String, i32)> = None;
    for key in dest_keys {
        let bn = base_name(key).to_lowercase();
        let mut score = 0;
        if bn == format!("{id}.jpg") {
            score += 100;
        }
        if bn == format!("{id}.jpeg") {
            score += 99;
        }
        if bn.contains(&id) {
            score += 50;
        }
        if main_cover.is_match(key) {
            score += 40;
        }
        if front_one.is_match(key) {
            score += 30;
        }
        if jpeg.is_match(&bn) {
            score += 10;
        }
        // strictly-greater keeps the first of equal scores
        if best.map(|(_, s)| score > s).unwrap_or(true) {
            best = Some((key, score));
        }
    }
    best.map(|(k, _)| k.clone())
        .or_else(|| dest_keys.first().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;

    #[test]
    fn main_hint_and_jpg_bonus_beat_other_formats() {
        let keys = vec![
            "photos/123/2.png".to_string(),
            "photos/123/main.jpg".to_string(),
        ];
        assert_eq!(choose_primary(&keys, "123").as_deref(), Some("photos/123/main.jpg"));
    }

    #[test]
    fn exact_identifier_name_outranks_hints() {
        let keys = vec![
            "photos/123/cover.jpg".to_string(),
            "photos/123/123.jpg".to_string(),
        ];
        assert_eq!(choose_primary(&keys, "123").as_deref(), Some("photos/123/123.jpg"));
    }

    #[test]
    fn first_listed_wins_ties() {
        let keys = vec![
            "photos/123/a.jpg".to_string(),
            "photos/123/b.jpg".to_string(),
        ];
        assert_eq!(choose_primary(&keys, "123").as_deref(), Some("photos/123/a.jpg"));
    }

    #[test]
    fn finds_folder_and_flat_candidates() {
        let store = MemStore::new();
        store.put("photos-incoming/123/main.jpg", b"a").unwrap();
        store.put("photos-incoming/123/notes.txt", b"b").unwrap();
        store.put("photos-incoming/123.png", b"c").unwrap();
        store.put("photos-incoming/999/other.jpg", b"d").unwrap();

        let matcher = PhotoMatcher::new(&store);
        let found = matcher.find_candidates("123").unwrap();
        assert_eq!(
            found,
            vec![
                "photos-incoming/123/main.jpg".to_string(),
                "photos-incoming/123.png".to_string(),
            ]
        );
    }

    #[test]
    fn move_copies_then_deletes_the_source() {
        let store = MemStore::new();
        store.put("photos-incoming/123/main.jpg", b"img").unwrap();

        let matcher = PhotoMatcher::new(&store);
        let moved = matcher.move_candidate("photos-incoming/123/main.jpg", "123").unwrap();

        assert_eq!(moved.dest, "photos/123/main.jpg");
        assert!(moved.source_deleted);
        assert_eq!(store.get("photos/123/main.jpg").unwrap(), Some(b"img".to_vec()));
        assert!(!store.exists("photos-incoming/123/main.jpg").unwrap());
    }
}
