// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

pub mod discovery;
pub mod image;
pub mod matrix;
pub mod metadata;

pub use discovery::{
    extension_directories, get_extensions, resolve_target, select_extensions, ExtensionFilter,
    Target,
};
pub use image::{
    default_extension_image, extension_image, extension_image_with_timestamp,
    extract_extension_version,
};
pub use matrix::{parse_build_matrix, BuildMatrix};
pub use metadata::{parse_extension_metadata, ExtensionMetadata, VersionMap};
