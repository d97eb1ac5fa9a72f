/// Side length of the normalized coordinate grid used by ordering models.
///
/// Models emit every coordinate in `0..=100` per axis, independent of the
/// source image resolution. Pixel coordinates are recovered with
/// `normalized * dimension / NORMALIZED_SCALE`.
pub const NORMALIZED_SCALE: f64 = 100.0;

/// Length of the short box identifiers written to the relation graph.
pub const ID_LEN: usize = 8;

/// Labels whose boxes share a single identifier across a page.
pub const DEFAULT_HEADER_FOOTER_LABELS: [&str; 2] = ["header", "footer"];

/// Languages handed to the OCR command when none are configured.
pub const DEFAULT_OCR_LANGUAGES: [&str; 2] = ["hi", "en"];

/// OCR command used when neither config nor environment names one.
pub const DEFAULT_OCR_PROGRAM: &str = "surya_ocr";

/// Environment variable overriding the OCR command.
pub const OCR_PROGRAM_ENV_NAME: &str = "READORDER_OCR_BIN";

/// Relation edge label between consecutive boxes.
pub const CONTINUES_TO: &str = "continues-to";

/// Direction attached to every relation edge.
pub const RELATION_DIRECTION: &str = "right";

/// Value of the `type` field of every relation edge.
pub const RELATION_TYPE: &str = "relation";

/// Column of the annotation CSV holding the JSON box list.
pub const ANNOTATION_COLUMN: &str = "annotation_bboxes";

/// Optional column of the annotation CSV naming the page image.
pub const IMAGE_PATH_COLUMN: &str = "image_path";

pub const BOXES_HEADER: [&str; 4] = ["x1", "y1", "x2", "y2"];
pub const LABELS_HEADER: [&str; 1] = ["label"];

pub const DEFAULT_INPUT_CSV: &str = "input.csv";
pub const DEFAULT_BOXES_CSV: &str = "output2_1im.csv";
pub const DEFAULT_LABELS_CSV: &str = "output1_1lab.csv";
pub const DEFAULT_IMAGE: &str = "test1.png";
pub const DEFAULT_OUTPUT_IMAGE: &str = "output_image.png";
pub const DEFAULT_RELATIONS_JSON: &str = "output_relations.json";

/// Outline color of every drawn box.
pub const BOX_COLOR: [u8; 3] = [255, 0, 0];
/// Color of the rank number drawn at the box corner.
pub const RANK_COLOR: [u8; 3] = [255, 0, 0];
/// Color of the label drawn above the box.
pub const LABEL_COLOR: [u8; 3] = [0, 128, 0];
/// Vertical offset of the label text above the box, in pixels.
pub const LABEL_OFFSET: i32 = 10;
pub const FONT_SIZE: f32 = 16.0;
pub const BOX_THICKNESS: i32 = 2;
