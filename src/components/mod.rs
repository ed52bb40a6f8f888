pub mod category_tabs;
pub mod force_graph;
pub mod selection_panel;
