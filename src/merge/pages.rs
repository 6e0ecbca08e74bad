//! Accumulating pages from several documents into one.
//!
//! Each appended document keeps its own page tree. The tree is renumbered
//! past every object already held, then hung as one kid under a fresh root
//! `Pages` node. Inherited attributes (`Resources`, `MediaBox`, `Rotate`)
//! therefore still resolve, and each document's internal page order is
//! untouched.
//!
//! ```text
//!           Catalog
//!              |
//!           Pages (root, Count = sum)
//!         /     |      \
//!   tree(A)  tree(B)  tree(C)
//! ```

use lopdf::{Document, Object, ObjectId, dictionary};

/// In-memory builder for the merged document.
#[derive(Debug)]
pub struct PageAccumulator {
    document: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    page_count: usize,
}

impl PageAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        Self {
            document,
            pages_id,
            kids: Vec::new(),
            page_count: 0,
        }
    }

    /// Pages appended so far.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// True until at least one page has been appended.
    pub fn is_empty(&self) -> bool {
        self.page_count == 0
    }

    /// Append every page of `source`, in order, and return how many there were.
    ///
    /// On error the accumulator is left unchanged.
    pub fn append(&mut self, mut source: Document) -> lopdf::Result<usize> {
        let count = source.get_pages().len();
        if count == 0 {
            return Ok(0);
        }

        source.renumber_objects_with(self.document.max_id + 1);

        let catalog_id = source.trailer.get(b"Root")?.as_reference()?;
        let subtree_id = source
            .get_object(catalog_id)?
            .as_dict()?
            .get(b"Pages")?
            .as_reference()?;

        source
            .get_object_mut(subtree_id)?
            .as_dict_mut()?
            .set("Parent", self.pages_id);

        // Outlines, forms and name trees hang off the catalog; they become
        // unreachable here and are pruned when the result is written.
        source.objects.remove(&catalog_id);

        // Objects of a decrypted source are plaintext; its crypt dictionary
        // must not travel with them.
        if let Ok(encrypt_id) = source.trailer.get(b"Encrypt").and_then(Object::as_reference) {
            source.objects.remove(&encrypt_id);
        }

        if source.version > self.document.version {
            self.document.version = source.version.clone();
        }
        self.document.max_id = self.document.max_id.max(source.max_id);
        self.document.objects.extend(source.objects);
        self.kids.push(subtree_id.into());
        self.page_count += count;

        Ok(count)
    }

    /// Close the page tree and return the finished document.
    pub fn finish(mut self) -> Document {
        self.document.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => self.page_count as i64,
            }),
        );

        let catalog_id = self.document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.document.trailer.set("Root", catalog_id);

        self.document
    }
}

impl Default for PageAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
