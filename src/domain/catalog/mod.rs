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

//! `ClusterImageCatalog` manifests listing extension images per postgres major

pub mod generator;
pub mod resource;

pub use generator::{
    catalog_file_name, generate_catalogs, load_minimal_catalogs, write_catalog, SourceCatalog,
};
pub use resource::{
    CatalogImage, ClusterImageCatalog, ClusterImageCatalogSpec, ExtensionConfiguration,
    ImageVolumeSource,
};
