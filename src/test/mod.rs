// BgpSim: BGP Network Simulator written in Rust
// Copyright 2022-2024 Tibor Schneider <sctibor@ethz.ch>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! End-to-end scenarios and cross-cutting properties.

mod helpers;
mod properties;
mod scenario_bhandari_square;
mod scenario_ecmp_diamond;
mod scenario_linear_rip;
mod scenario_max_flow;
mod scenario_ospf_inter_area;
mod scenario_traffic_split;
mod test_generators;
