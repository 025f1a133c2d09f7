mod category_dto;

pub use category_dto::{
    build_ancestor_path, index_translations, resolve_name, CategoryAdminDto, CategoryDetailDto,
    CategorySummaryDto, CategoryTranslationDto, CategoryTreeNodeDto, CreateCategoryDto,
    TranslationBodyDto, TranslationIndex, UpdateCategoryDto,
};
