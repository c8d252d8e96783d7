//! Id generation for new elements and sections.

use uuid::Uuid;

pub fn element_id() -> String {
    format!("el-{}", Uuid::new_v4().simple())
}

pub fn section_id() -> String {
    format!("sec-{}", Uuid::new_v4().simple())
}
